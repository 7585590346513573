use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, is_word_byte,
    matches_tag, try_start_dollar_quote,
};

#[derive(Clone, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

impl State {
    fn is_comment(&self) -> bool {
        matches!(self, State::LineComment | State::BlockComment(_))
    }
}

/// An uppercase word and whether it sat inside quotes of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Word {
    pub(crate) text: String,
    pub(crate) quoted: bool,
}

/// Split SQL into uppercase words.
///
/// Comments act as separators and produce no words. Words inside string
/// literals, quoted identifiers (`"..."`, `[...]`) and dollar-quoted bodies
/// are kept and flagged as quoted: a literal can still reach `EXEC` or
/// dynamic SQL.
pub(crate) fn words(sql: &str) -> Vec<Word> {
    let bytes = sql.as_bytes();
    let mut words = Vec::new();
    let mut word_start: Option<(usize, bool)> = None;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if is_word_byte(b) && !state.is_comment() {
            word_start.get_or_insert((idx, state != State::Normal));
            idx += 1;
            continue;
        }
        if let Some((start, quoted)) = word_start.take() {
            words.push(Word {
                text: sql[start..idx].to_uppercase(),
                quoted,
            });
        }

        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    if let Some((start, quoted)) = word_start {
        words.push(Word {
            text: sql[start..].to_uppercase(),
            quoted,
        });
    }
    words
}

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::{BoundedQuery, ValidatedQuery};
use crate::dialect::{DialectProfile, PaginationStrategy};

static LIMIT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\b").expect("LIMIT pattern is valid"));
static TOP_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bTOP\b").expect("TOP pattern is valid"));
static SELECT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").expect("SELECT pattern is valid"));

/// Cap the rows a validated query can return, using the profile's pagination syntax.
///
/// * `SuffixLimit`: when no `LIMIT` word is present, one trailing `;` is
///   dropped and `LIMIT <cap>` appended. Applying it twice changes nothing.
///   When the last line carries a `--` comment the cap goes on a new line so
///   the comment cannot swallow it.
/// * `PrefixTop`: when no `TOP` word is present, `TOP <cap>` is inserted after
///   the first `SELECT` word only, even when that `SELECT` sits inside a CTE
///   rather than the outer statement. Text without `SELECT` is left alone.
#[must_use]
pub fn normalize(query: &ValidatedQuery, profile: &DialectProfile) -> BoundedQuery {
    let row_cap = profile.row_cap();
    let text = match profile.pagination() {
        PaginationStrategy::SuffixLimit => append_limit(query.as_str(), row_cap),
        PaginationStrategy::PrefixTop => inject_top(query.as_str(), row_cap),
    };
    BoundedQuery {
        text: text.into_owned(),
        row_cap,
    }
}

fn append_limit(text: &str, row_cap: usize) -> Cow<'_, str> {
    if LIMIT_WORD.is_match(text) {
        return Cow::Borrowed(text);
    }
    let body = text.trim_end();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let separator = if ends_in_line_comment(body) { '\n' } else { ' ' };
    Cow::Owned(format!("{body}{separator}LIMIT {row_cap}"))
}

fn ends_in_line_comment(body: &str) -> bool {
    body.lines().next_back().is_some_and(|line| line.contains("--"))
}

fn inject_top(text: &str, row_cap: usize) -> Cow<'_, str> {
    if TOP_WORD.is_match(text) {
        return Cow::Borrowed(text);
    }
    match SELECT_WORD.find(text) {
        Some(select) => Cow::Owned(format!(
            "{} TOP {row_cap}{}",
            &text[..select.end()],
            &text[select.end()..]
        )),
        None => Cow::Borrowed(text),
    }
}

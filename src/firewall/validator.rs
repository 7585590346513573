use super::scanner::words;
use super::{Rejection, ValidatedQuery};
use crate::dialect::{DialectProfile, KeywordMatch};

const MAX_REPORTED_PREFIX: usize = 32;

/// Decide whether `query` may run under `profile`.
///
/// The prefix whitelist runs first, then the keyword blocklist. Under
/// [`KeywordMatch::Substring`] a keyword anywhere in the uppercased text
/// rejects, including inside identifiers (`UPDATED_AT` trips `UPDATE`) and
/// literals. Keywords split by comments or quoting are not detected there.
/// Under [`KeywordMatch::Token`] keywords must be whole words, but words
/// inside literals and quoted identifiers still count, so
/// `EXEC('DROP TABLE t')` is rejected.
///
/// # Errors
/// Returns the [`Rejection`] describing the first failed check.
pub fn validate(query: &str, profile: &DialectProfile) -> Result<ValidatedQuery, Rejection> {
    match profile.keyword_match() {
        KeywordMatch::Substring => check_substring(query, profile)?,
        KeywordMatch::Token => check_tokens(query, profile)?,
    }
    Ok(ValidatedQuery {
        text: query.trim().to_string(),
    })
}

fn check_substring(query: &str, profile: &DialectProfile) -> Result<(), Rejection> {
    let normalized = query.trim().to_uppercase();

    if !profile
        .allowed_prefixes()
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
    {
        return Err(Rejection::NotReadOnly {
            leading: leading_word(&normalized),
        });
    }

    match profile
        .blocked_keywords()
        .iter()
        .find(|keyword| normalized.contains(**keyword))
    {
        Some(keyword) => Err(Rejection::BlockedKeyword {
            keyword: (*keyword).to_string(),
        }),
        None => Ok(()),
    }
}

fn check_tokens(query: &str, profile: &DialectProfile) -> Result<(), Rejection> {
    let words = words(query);

    let first = words.first();
    if !first.is_some_and(|word| {
        !word.quoted && profile.allowed_prefixes().contains(&word.text.as_str())
    }) {
        return Err(Rejection::NotReadOnly {
            leading: first.map(|w| w.text.chars().take(MAX_REPORTED_PREFIX).collect()),
        });
    }

    match profile
        .blocked_keywords()
        .iter()
        .find(|keyword| words.iter().any(|word| word.text == **keyword))
    {
        Some(keyword) => Err(Rejection::BlockedKeyword {
            keyword: (*keyword).to_string(),
        }),
        None => Ok(()),
    }
}

fn leading_word(normalized: &str) -> Option<String> {
    let first = normalized.split_whitespace().next()?;
    let word = first.trim_end_matches(';');
    let word = if word.is_empty() { first } else { word };
    Some(word.chars().take(MAX_REPORTED_PREFIX).collect())
}

use std::error::Error as _;

/// Render a driver error with its whole cause chain.
///
/// `tokio_postgres::Error` displays only its kind (`db error`, `invalid
/// configuration`); the server message and SQLSTATE live in the source.
pub(crate) fn describe_error(e: &tokio_postgres::Error) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    if let Some(db) = e.as_db_error() {
        text = format!("{text} (SQLSTATE {})", db.code().code());
    }
    text
}

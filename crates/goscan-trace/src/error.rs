use thiserror::Error;

/// Errors from parsing tracer output.
///
/// Only a malformed pid token is a contract violation worth failing the
/// whole stream over — everything
/// else (unmatched `resumed>`, lines that don't match any known shape) is
/// a locally recovered warning, logged via `tracing` and not surfaced as
/// an `Err`.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line_no}: pid token {token:?} is not a valid non-negative integer")]
    InvalidPid { line_no: usize, token: String },
}

pub type Result<T> = std::result::Result<T, TraceError>;

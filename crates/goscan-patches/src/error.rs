use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("url {0:?} does not match a commit or pull-request shape")]
    UnrecognizedUrlShape(String),

    #[error("host {0:?} is not a known Git-hosting domain")]
    UnknownHost(String),

    #[error("GitHub API request failed: {0}")]
    Api(#[from] octocrab::Error),

    #[error("rate limit retries exhausted for {0:?}")]
    RateLimitExhausted(String),

    #[error("GitHub request for {url:?} did not complete within {timeout:?}")]
    TimedOut { url: String, timeout: std::time::Duration },

    #[error("scan cancelled while waiting on GitHub request for {url:?}")]
    Cancelled { url: String },
}

pub type Result<T> = std::result::Result<T, PatchError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("dpkg stdout carried 'dpkg-query: no path' — expected on stderr, not stdout: {0:?}")]
    UnexpectedNoPathOnStdout(String),

    #[error("internal invariant broken: no provenance recorded for probe path {0:?}")]
    MissingProvenance(String),

    #[error("apt-cache record did not begin with 'Package:': {0:?}")]
    MetadataContractViolation(String),

    #[error("failed to invoke external command {command:?}: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external command {command:?} exited with non-zero status {status}")]
    CommandNonZero { command: String, status: i32 },

    #[error("external command {command:?} did not complete within {timeout:?}")]
    CommandTimedOut {
        command: String,
        timeout: std::time::Duration,
    },

    #[error("scan cancelled while waiting on external command {command:?}")]
    Cancelled { command: String },
}

pub type Result<T> = std::result::Result<T, ResolverError>;

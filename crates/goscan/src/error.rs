//! Top-level error type. `main` maps contract-violation and external
//! command-failure variants to exit code 1; exit code 0 is reserved for a
//! completed scan (vulnerable or not), per §6.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Trace(#[from] goscan_trace::TraceError),

    #[error(transparent)]
    Resolver(#[from] goscan_resolver::ResolverError),

    #[error(transparent)]
    Corpus(#[from] goscan_vulndb::CorpusError),

    #[error(transparent)]
    Patches(#[from] goscan_patches::PatchError),

    #[error("failed to invoke external command {command:?}: {source}")]
    ExternalCommand {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external command {command:?} exited with non-zero status {status}")]
    ExternalCommandFailed { command: String, status: i32 },

    #[error("could not determine host codename: pass --codename or install lsb_release")]
    UnknownHostCodename,

    #[error("external command {command:?} did not complete within {timeout:?}")]
    CommandTimedOut { command: String, timeout: std::time::Duration },

    #[error("scan cancelled while waiting on external command {command:?}")]
    Cancelled { command: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Every variant here is either a contract violation or an external
    /// command failure (§7): both are fatal, so this always returns 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

//! Injected configuration.
//!
//! Per the "global mutable state" design note: the logger and the
//! VulnStore path are process-wide in the original source. Here they are
//! read once into a `GoscanConfig` record in `main` and threaded through
//! constructors explicitly — no crate in this workspace reads environment
//! variables outside of `GoscanConfig::from_env`.

use std::path::PathBuf;
use std::time::Duration;

/// Default location (relative to the working directory) of the CVE corpus,
/// matching the upstream tracker's fixed `vulnsrc/ubuntu/...` path.
pub const DEFAULT_CORPUS_DIR: &str = "vulnsrc/ubuntu/ubuntu-cve-tracker/active";

/// Default VulnStore file name, relative to the cache directory.
pub const DEFAULT_STORE_FILE: &str = "vulndb.sqlite3";

/// Default deadline for any single external invocation (subprocess or Git
/// API call) before it is treated as hung and aborted.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct GoscanConfig {
    /// Run the system-call trace + resolve + cross-reference pipeline.
    pub strace_enabled: bool,
    /// Reserved library-call coverage mode.
    pub ltrace_enabled: bool,
    /// Rebuild VulnStore from the on-disk corpus before scanning.
    pub rebuild_db: bool,
    /// Bearer token for the Git-hosting API, if configured.
    pub github_token: Option<String>,
    /// Default owner for author-qualified lookups.
    pub github_author: Option<String>,
    /// Directory holding trace output, logs, and the VulnStore file.
    pub cache_dir: PathBuf,
    /// Directory holding the flat-text CVE corpus.
    pub corpus_dir: PathBuf,
    /// Host Ubuntu codename; `None` means "detect via `lsb_release`".
    pub codename: Option<String>,
    /// Deadline for any single external invocation.
    pub command_timeout: Duration,
}

impl Default for GoscanConfig {
    fn default() -> Self {
        Self {
            strace_enabled: false,
            ltrace_enabled: false,
            rebuild_db: false,
            github_token: None,
            github_author: None,
            cache_dir: crate::cache_dir(),
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            codename: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl GoscanConfig {
    /// Build a config from environment variables, with the given defaults
    /// used when a variable is unset. Does not itself load a `.env` file —
    /// the caller (the `goscan` binary) is responsible for that, since
    /// dotenv loading is I/O that belongs at the entry point, not in a
    /// library crate.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.strace_enabled = env_is_on("GOSCAN_STRACE");
        cfg.ltrace_enabled = env_is_on("GOSCAN_LTRACE");
        cfg.rebuild_db = env_is_on("GOSCAN_NEWDB");
        cfg.github_token = std::env::var("GITHUB_ACCESS_TOKEN").ok().filter(|s| !s.is_empty());
        cfg.github_author = std::env::var("GITHUB_AUTHOR").ok().filter(|s| !s.is_empty());
        if let Some(secs) = std::env::var("GOSCAN_COMMAND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            cfg.command_timeout = Duration::from_secs(secs);
        }
        cfg
    }

    pub fn store_path(&self) -> PathBuf {
        self.cache_dir.join(DEFAULT_STORE_FILE)
    }
}

fn env_is_on(name: &str) -> bool {
    std::env::var(name).map(|v| v == "on").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let cfg = GoscanConfig::default();
        assert!(!cfg.strace_enabled);
        assert!(!cfg.rebuild_db);
        assert_eq!(cfg.corpus_dir, PathBuf::from(DEFAULT_CORPUS_DIR));
        assert_eq!(cfg.command_timeout, DEFAULT_COMMAND_TIMEOUT);
    }

    #[test]
    fn store_path_joins_cache_dir() {
        let mut cfg = GoscanConfig::default();
        cfg.cache_dir = PathBuf::from("/tmp/goscan-test-cache");
        assert_eq!(
            cfg.store_path(),
            PathBuf::from("/tmp/goscan-test-cache/vulndb.sqlite3")
        );
    }
}

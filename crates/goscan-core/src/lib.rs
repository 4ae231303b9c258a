//! Shared types and configuration for goscan
//!
//! This crate provides the cross-cutting pieces used by every other
//! `goscan-*` crate:
//! - cache-directory helpers
//! - `GoscanConfig`, the injected configuration record (see the "no global
//!   mutable state" design note)
//! - `UbuntuVersion`, the (codename, special-support) pair shared by the
//!   CVE corpus parser and the exploitability engine

use std::path::PathBuf;

pub mod config;
pub mod version;

/// goscan's crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Root cache directory for goscan, e.g. `~/.cache/goscan`.
///
/// Creates the directory if it doesn't already exist.
pub fn cache_dir() -> PathBuf {
    let dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goscan");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// A subdirectory within goscan's cache directory, e.g. `cache_subdir("trace")`.
pub fn cache_subdir(name: &str) -> PathBuf {
    let dir = cache_dir().join(name);
    let _ = std::fs::create_dir_all(&dir);
    dir
}

pub use config::GoscanConfig;
pub use version::{is_known_codename, is_special_support, SpecialSupport, UbuntuVersion};

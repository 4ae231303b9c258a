//! Traces a dynamically linked executable's shared-library usage, resolves
//! the paths it touches back to Debian/Ubuntu source packages, and
//! cross-references a reachability-filtered CVE corpus.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod tracer;

pub use cli::Cli;
pub use error::ScanError;

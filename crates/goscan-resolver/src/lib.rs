//! Resolves observed shared-library file paths to the Debian/Ubuntu binary
//! packages that own them, and looks up those packages' source-package
//! metadata.
//!
//! Two independent responsibilities live here: [`resolve::resolve_packages`]
//! drives the iterative `dpkg -S` path-escalation algorithm; [`metadata`]
//! parses `apt-cache show` records into [`metadata::BinaryPackage`]s.
//! Neither module performs I/O directly — [`process`] supplies the real
//! external-command implementations behind the [`resolve::DpkgQuery`] trait.

mod deadline;
pub mod error;
pub mod metadata;
pub mod process;
pub mod resolve;

pub use error::{Result, ResolverError};
pub use metadata::{filter_package_lines, parse_metadata, BinaryPackage};
pub use process::{apt_cache_show, ProcessDpkgQuery};
pub use resolve::{resolve_packages, DpkgQuery};

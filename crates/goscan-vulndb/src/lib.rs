//! CVE corpus parsing and persistent vulnerability store.
//!
//! [`corpus::parse_cve_file`] turns one flat-text Ubuntu CVE Tracker
//! record into an [`types::UbuntuCve`]; [`ingest::ingest_corpus`] drives
//! that over a whole directory; [`store::VulnStore`] persists the result
//! for point lookup by candidate id or by source package.

pub mod corpus;
pub mod error;
pub mod ingest;
pub mod store;
pub mod types;

pub use corpus::parse_cve_file;
pub use error::{CorpusError, Result};
pub use ingest::ingest_corpus;
pub use store::VulnStore;
pub use types::{PatchData, PerVersionEntry, StoreKey, UbuntuCve};

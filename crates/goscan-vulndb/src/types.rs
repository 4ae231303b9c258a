//! Parsed representation of a single CVE corpus record.

use goscan_core::UbuntuVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `<codename>[/<special-support>]` affection record within a
/// `Patches_<source>:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerVersionEntry {
    pub affected: String,
    pub sub_info: String,
}

/// The patch data recorded for one source package within a CVE.
///
/// `per_version` is keyed by [`UbuntuVersion::store_key`] rather than the
/// struct itself: `serde_json` cannot serialize a map whose keys aren't
/// strings, and the corpus's own textual convention already writes this
/// key as a single `codename` or `codename/support` token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchData {
    pub upstream_urls: Vec<String>,
    pub per_version: BTreeMap<String, PerVersionEntry>,
}

impl PatchData {
    pub fn get(&self, version: &UbuntuVersion) -> Option<&PerVersionEntry> {
        self.per_version.get(&version.store_key())
    }

    pub fn insert(&mut self, version: &UbuntuVersion, entry: PerVersionEntry) {
        self.per_version.insert(version.store_key(), entry);
    }
}

/// A single Ubuntu CVE Tracker record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UbuntuCve {
    pub candidate: String,
    #[serde(default)]
    pub public_date_at_usn: String,
    #[serde(default)]
    pub public_date: String,
    #[serde(default)]
    pub crd: String,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ubuntu_description: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub mitigation: String,
    #[serde(default)]
    pub bugs: Vec<String>,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub discovered_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub patches: BTreeMap<String, PatchData>,
}

/// Maps an [`UbuntuVersion`] to the single-token string key used in
/// [`PatchData::per_version`] and in the corpus's own textual convention.
pub trait StoreKey {
    fn store_key(&self) -> String;
}

impl StoreKey for UbuntuVersion {
    fn store_key(&self) -> String {
        if self.special_support.is_empty() {
            self.codename.clone()
        } else {
            format!("{}/{}", self.codename, self.special_support)
        }
    }
}

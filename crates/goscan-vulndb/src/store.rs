//! Persistent CVE store backed by SQLite.
//!
//! Two tables mirror the two logical indexes described in §4.5: `cve_by_id`
//! keyed by candidate id, `cve_by_source` as the source-package inverse
//! index. Rebuilds drop and repopulate both tables inside a single
//! transaction, so a crash mid-rebuild leaves the previous store intact.

use crate::error::Result;
use crate::types::UbuntuCve;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

pub struct VulnStore {
    conn: Connection,
}

impl VulnStore {
    /// Open (creating if absent) the store at `path`, ensuring its schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cve_by_id (
                candidate TEXT PRIMARY KEY,
                payload TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cve_by_source (
                source TEXT NOT NULL,
                candidate TEXT NOT NULL,
                PRIMARY KEY (source, candidate)
            );",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory store, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE cve_by_id (
                candidate TEXT PRIMARY KEY,
                payload TEXT NOT NULL
            );
            CREATE TABLE cve_by_source (
                source TEXT NOT NULL,
                candidate TEXT NOT NULL,
                PRIMARY KEY (source, candidate)
            );",
        )?;
        Ok(Self { conn })
    }

    /// Drop and repopulate both tables from `cves`, in one transaction.
    pub fn rebuild(&mut self, cves: &[UbuntuCve]) -> Result<()> {
        info!(count = cves.len(), "rebuilding vuln store");
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cve_by_id", [])?;
        tx.execute("DELETE FROM cve_by_source", [])?;

        for cve in cves {
            let payload = serde_json::to_string(cve)?;
            tx.execute(
                "INSERT INTO cve_by_id (candidate, payload) VALUES (?1, ?2)",
                (&cve.candidate, &payload),
            )?;
            for source in cve.patches.keys() {
                tx.execute(
                    "INSERT OR IGNORE INTO cve_by_source (source, candidate) VALUES (?1, ?2)",
                    (source, &cve.candidate),
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Look up a CVE by candidate id.
    pub fn get_by_id(&self, candidate: &str) -> Result<Option<UbuntuCve>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM cve_by_id WHERE candidate = ?1")?;
        let mut rows = stmt.query([candidate])?;
        match rows.next()? {
            Some(row) => {
                let payload: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    /// Candidate ids whose patches mention `source`.
    pub fn get_by_source(&self, source: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT candidate FROM cve_by_source WHERE source = ?1 ORDER BY candidate")?;
        let rows = stmt.query_map([source], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Full CVE records for every candidate associated with `source`.
    pub fn cves_for_source(&self, source: &str) -> Result<Vec<UbuntuCve>> {
        let ids = self.get_by_source(source)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(cve) = self.get_by_id(&id)? {
                out.push(cve);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PatchData, PerVersionEntry};

    fn sample_cve(candidate: &str, source: &str) -> UbuntuCve {
        let mut cve = UbuntuCve {
            candidate: candidate.to_string(),
            ..Default::default()
        };
        let mut patch = PatchData::default();
        patch.per_version.insert(
            "jammy".to_string(),
            PerVersionEntry {
                affected: "needed".to_string(),
                sub_info: String::new(),
            },
        );
        cve.patches.insert(source.to_string(), patch);
        cve
    }

    #[test]
    fn rebuild_then_lookup_by_id() {
        let mut store = VulnStore::open_in_memory().unwrap();
        let cve = sample_cve("CVE-2024-0001", "libfoo");
        store.rebuild(&[cve.clone()]).unwrap();
        let fetched = store.get_by_id("CVE-2024-0001").unwrap().unwrap();
        assert_eq!(fetched, cve);
    }

    #[test]
    fn cve_by_source_contains_every_source_the_cve_names() {
        let mut store = VulnStore::open_in_memory().unwrap();
        let cve = sample_cve("CVE-2024-0002", "libbar");
        store.rebuild(&[cve.clone()]).unwrap();
        let ids = store.get_by_source("libbar").unwrap();
        assert!(ids.contains(&"CVE-2024-0002".to_string()));
    }

    #[test]
    fn rebuild_drops_previous_contents() {
        let mut store = VulnStore::open_in_memory().unwrap();
        store.rebuild(&[sample_cve("CVE-2024-0003", "libbaz")]).unwrap();
        store.rebuild(&[sample_cve("CVE-2024-0004", "libqux")]).unwrap();
        assert!(store.get_by_id("CVE-2024-0003").unwrap().is_none());
        assert!(store.get_by_id("CVE-2024-0004").unwrap().is_some());
    }

    #[test]
    fn missing_candidate_returns_none() {
        let store = VulnStore::open_in_memory().unwrap();
        assert!(store.get_by_id("CVE-9999-9999").unwrap().is_none());
    }
}

//! Reads every `CVE*` file in a corpus directory and parses it.
//!
//! Parallelized with `std::thread::scope` over per-thread-local result
//! vectors merged at the end, per §5 — no shared mutex needed since each
//! file's parse result is independent.

use crate::corpus::parse_cve_file;
use crate::error::Result;
use crate::types::UbuntuCve;
use std::path::Path;
use tracing::warn;

/// Number of worker threads used to parse the corpus directory.
const WORKERS: usize = 4;

/// Parse every `CVE*`-named file directly inside `corpus_dir`.
///
/// Per-file parse errors are logged and the file is skipped rather than
/// aborting the whole ingestion run, since one malformed corpus file
/// shouldn't prevent scanning against the rest of the corpus — contract
/// violations are still fatal at the single-file `parse_cve_file` level,
/// this function just isolates that fatality to one file.
pub fn ingest_corpus(corpus_dir: &Path) -> Result<Vec<UbuntuCve>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(corpus_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with("CVE") && entry.path().is_file() {
            paths.push(entry.path());
        }
    }

    let chunk_size = paths.len().div_ceil(WORKERS).max(1);
    let chunks: Vec<&[std::path::PathBuf]> = paths.chunks(chunk_size).collect();

    let results: Vec<UbuntuCve> = std::thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                scope.spawn(move || {
                    let mut local = Vec::new();
                    for path in chunk {
                        match std::fs::read_to_string(path) {
                            Ok(contents) => match parse_cve_file(&contents) {
                                Ok(cve) => local.push(cve),
                                Err(err) => {
                                    warn!(path = %path.display(), %err, "failed to parse CVE file, skipping");
                                }
                            },
                            Err(err) => {
                                warn!(path = %path.display(), %err, "failed to read CVE file, skipping");
                            }
                        }
                    }
                    local
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap_or_default()).collect()
    });

    Ok(results)
}

//! Filters candidate CVEs to those judged exploitable under a host's
//! codename and a traced process's observed shared-library paths.
//!
//! The filter sequence in [`filter_exploitable`] takes an already-resolved
//! map of upstream patch URL → fixed file paths rather than calling
//! `goscan-patches` itself, so this crate stays synchronous: resolving
//! those URLs (the only network-bound step in the whole pipeline) happens
//! once, up front, in the orchestrating binary.

use goscan_core::UbuntuVersion;
use goscan_patches::is_known_git_host;
use goscan_vulndb::UbuntuCve;
use std::collections::{HashMap, HashSet};
use tracing::info;

const NOT_AFFECTED_MARKERS: &[&str] = &["DNE", "not-affected"];

/// For one source package, return the subset of `candidates` judged
/// exploitable under `host_version` given `observed_paths` and the
/// pre-resolved `fixed_files_by_url` map.
pub fn filter_exploitable(
    host_version: &UbuntuVersion,
    source: &str,
    observed_paths: &HashSet<String>,
    candidates: &[UbuntuCve],
    fixed_files_by_url: &HashMap<String, HashSet<String>>,
) -> Vec<UbuntuCve> {
    candidates
        .iter()
        .filter(|cve| is_exploitable(host_version, source, observed_paths, cve, fixed_files_by_url))
        .cloned()
        .collect()
}

fn is_exploitable(
    host_version: &UbuntuVersion,
    source: &str,
    observed_paths: &HashSet<String>,
    cve: &UbuntuCve,
    fixed_files_by_url: &HashMap<String, HashSet<String>>,
) -> bool {
    let Some(patch) = cve.patches.get(source) else {
        return false;
    };

    let Some(pv) = patch.get(host_version) else {
        info!(
            candidate = cve.candidate,
            source, "host codename absent from perVersion, no claim for this host"
        );
        return false;
    };

    if NOT_AFFECTED_MARKERS
        .iter()
        .any(|marker| pv.affected.eq_ignore_ascii_case(marker))
    {
        return false;
    }

    if patch.upstream_urls.is_empty() {
        // Affected, no known patch: conservative include.
        return true;
    }

    let fixed_files: HashSet<&str> = patch
        .upstream_urls
        .iter()
        .filter(|url| is_known_git_host(url))
        .filter_map(|url| fixed_files_by_url.get(url))
        .flat_map(|files| files.iter().map(String::as_str))
        .collect();

    observed_paths
        .iter()
        .any(|observed| fixed_files.iter().any(|fixed| observed.contains(fixed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use goscan_vulndb::{PatchData, PerVersionEntry};

    fn cve_with(source: &str, affected: &str, upstream_urls: Vec<&str>) -> UbuntuCve {
        let mut cve = UbuntuCve {
            candidate: "CVE-2024-0001".to_string(),
            ..Default::default()
        };
        let mut patch = PatchData {
            upstream_urls: upstream_urls.into_iter().map(str::to_string).collect(),
            ..Default::default()
        };
        patch.insert(
            &UbuntuVersion::new("jammy"),
            PerVersionEntry {
                affected: affected.to_string(),
                sub_info: String::new(),
            },
        );
        cve.patches.insert(source.to_string(), patch);
        cve
    }

    #[test]
    fn missing_host_version_is_dropped() {
        let cve = cve_with("libfoo", "needed", vec![]);
        let observed = HashSet::from(["/usr/lib/libfoo.so".to_string()]);
        let result = filter_exploitable(
            &UbuntuVersion::new("focal"),
            "libfoo",
            &observed,
            &[cve],
            &HashMap::new(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn not_affected_is_dropped() {
        let cve = cve_with("libfoo", "not-affected", vec![]);
        let observed = HashSet::from(["/usr/lib/libfoo.so".to_string()]);
        let result = filter_exploitable(
            &UbuntuVersion::new("jammy"),
            "libfoo",
            &observed,
            &[cve],
            &HashMap::new(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn affected_with_no_upstream_urls_is_conservatively_included() {
        let cve = cve_with("libfoo", "needed", vec![]);
        let observed = HashSet::from(["/usr/lib/libfoo.so".to_string()]);
        let result = filter_exploitable(
            &UbuntuVersion::new("jammy"),
            "libfoo",
            &observed,
            &[cve],
            &HashMap::new(),
        );
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn substring_match_against_fixed_file_includes_cve() {
        let cve = cve_with(
            "libfoo",
            "needed",
            vec!["https://github.com/owner/repo/commit/abc"],
        );
        let mut fixed_files = HashMap::new();
        fixed_files.insert(
            "https://github.com/owner/repo/commit/abc".to_string(),
            HashSet::from(["src/foo.c".to_string()]),
        );
        let observed = HashSet::from(["/build/libfoo-1.0/src/foo.c".to_string()]);
        let result = filter_exploitable(
            &UbuntuVersion::new("jammy"),
            "libfoo",
            &observed,
            &[cve],
            &fixed_files,
        );
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn no_matching_observed_path_excludes_cve() {
        let cve = cve_with(
            "libfoo",
            "needed",
            vec!["https://github.com/owner/repo/commit/abc"],
        );
        let mut fixed_files = HashMap::new();
        fixed_files.insert(
            "https://github.com/owner/repo/commit/abc".to_string(),
            HashSet::from(["src/foo.c".to_string()]),
        );
        let observed = HashSet::from(["/usr/lib/x86_64-linux-gnu/libfoo.so.1".to_string()]);
        let result = filter_exploitable(
            &UbuntuVersion::new("jammy"),
            "libfoo",
            &observed,
            &[cve],
            &fixed_files,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn unresolved_url_contributes_no_fixed_files_but_does_not_error() {
        let cve = cve_with(
            "libfoo",
            "needed",
            vec!["https://git.launchpad.net/owner/repo/commit/abc"],
        );
        let observed = HashSet::from(["/usr/lib/libfoo.so".to_string()]);
        let result = filter_exploitable(
            &UbuntuVersion::new("jammy"),
            "libfoo",
            &observed,
            &[cve],
            &HashMap::new(),
        );
        assert!(result.is_empty());
    }
}

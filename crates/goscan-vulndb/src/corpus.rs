//! Parses flat-text Ubuntu CVE Tracker records into [`UbuntuCve`] values.

use crate::error::{CorpusError, Result};
use crate::types::{PatchData, PerVersionEntry, UbuntuCve};
use goscan_core::{is_known_codename, is_special_support};
use tracing::warn;

const META_KEYS: &[&str] = &[
    "PublicDateAtUSN",
    "Candidate",
    "PublicDate",
    "CRD",
    "References",
    "Description",
    "Ubuntu-Description",
    "Notes",
    "Mitigation",
    "Bugs",
    "Priority",
    "Discovered-by",
    "Assigned-to",
    "CVSS",
];

const UPSTREAM_PREFIXES: &[&str] = &[
    "upstream:",
    "vendor:",
    "suse:",
    "opensuse:",
    "debdiff:",
    "other:",
    "distro:",
    "debian:",
    "android:",
    "ubuntu:",
    "redhat:",
    "usptream:",
];

/// Parse one CVE Tracker flat-text file's contents into an [`UbuntuCve`].
///
/// The file is a meta region (a sequence of `Key: content` stanzas,
/// terminated by encountering `CVSS`) followed by a patches region
/// (blocks separated by a blank line, each headed `Patches_<source>:`).
pub fn parse_cve_file(input: &str) -> Result<UbuntuCve> {
    let lines: Vec<&str> = input.lines().collect();
    let mut builder = UbuntuCveBuilder::default();

    let mut idx = 0;
    let mut seen_cvss = false;
    while idx < lines.len() && !seen_cvss {
        let line = lines[idx];
        if line.trim().is_empty() {
            idx += 1;
            continue;
        }
        let Some((key, rest)) = split_stanza_head(line) else {
            idx += 1;
            continue;
        };
        if starts_patches_or_tags(key) {
            // Meta region implicitly ends when we hit a Patches_/Tags_ line
            // without having seen CVSS first.
            break;
        }
        if !META_KEYS.contains(&key) {
            return Err(CorpusError::UnrecognizedMetaKey(key.to_string()));
        }

        let mut content = vec![rest.to_string()];
        idx += 1;
        while idx < lines.len() {
            let next = lines[idx];
            if split_stanza_head(next)
                .map(|(k, _)| META_KEYS.contains(&k) || starts_patches_or_tags(k))
                .unwrap_or(false)
            {
                break;
            }
            content.push(next.to_string());
            idx += 1;
        }
        let joined = content.join("\n").trim().to_string();
        builder.assign(key, joined)?;

        if key == "CVSS" {
            seen_cvss = true;
        }
    }

    let remainder = lines[idx..].join("\n");
    parse_patches_region(&remainder, &mut builder)?;

    Ok(builder.build())
}

fn split_stanza_head(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let key = &line[..colon];
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    let rest = line[colon + 1..].trim_start();
    Some((key, rest))
}

fn starts_patches_or_tags(key: &str) -> bool {
    key.starts_with("Patches_") || key.starts_with("Tags_")
}

#[derive(Default)]
struct UbuntuCveBuilder {
    cve: UbuntuCve,
}

impl UbuntuCveBuilder {
    fn assign(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "Candidate" => self.cve.candidate = value,
            "PublicDateAtUSN" => self.cve.public_date_at_usn = value,
            "PublicDate" => self.cve.public_date = value,
            "CRD" => self.cve.crd = value,
            "References" => self.cve.references = split_nonempty_lines(&value),
            "Description" => self.cve.description = value,
            "Ubuntu-Description" => self.cve.ubuntu_description = value,
            "Notes" => self.cve.notes = split_nonempty_lines(&value),
            "Mitigation" => self.cve.mitigation = value,
            "Bugs" => self.cve.bugs = split_nonempty_lines(&value),
            "Priority" => self.cve.priority = value,
            "Discovered-by" => self.cve.discovered_by = value,
            "Assigned-to" => self.cve.assigned_to = value,
            "CVSS" => {}
            other => return Err(CorpusError::UnrecognizedMetaKey(other.to_string())),
        }
        Ok(())
    }

    fn build(self) -> UbuntuCve {
        self.cve
    }
}

fn split_nonempty_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn parse_patches_region(input: &str, builder: &mut UbuntuCveBuilder) -> Result<()> {
    let blocks: Vec<&str> = input
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();

    for block in blocks {
        let mut block_lines = block.lines();
        let Some(header) = block_lines.next() else {
            continue;
        };
        let Some(source) = header
            .strip_prefix("Patches_")
            .and_then(|rest| rest.strip_suffix(':'))
        else {
            return Err(CorpusError::MalformedPatchesBlock(header.to_string()));
        };

        let patch_data = builder
            .cve
            .patches
            .entry(source.to_string())
            .or_insert_with(PatchData::default);

        for line in block_lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            parse_patch_line(line, patch_data)?;
        }
    }

    Ok(())
}

fn parse_patch_line(line: &str, patch_data: &mut PatchData) -> Result<()> {
    if let Some(prefix) = UPSTREAM_PREFIXES.iter().find(|p| line.starts_with(*p)) {
        let rest = line[prefix.len()..].trim();
        if let Some(url) = rest.split_whitespace().next() {
            patch_data.upstream_urls.push(url.to_string());
        }
        return Ok(());
    }

    if line.ends_with("break-fix:") {
        return Ok(());
    }

    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(());
    };

    if first.starts_with("Priority_") || first.starts_with("Tags_") || first.starts_with("Patches_") {
        return Ok(());
    }

    let Some(ident) = first.strip_suffix(':').or_else(|| {
        first.split_once(':').map(|(before, _)| before)
    }) else {
        warn!(line, "patch line missing version identifier colon, skipping");
        return Ok(());
    };

    let parts: Vec<&str> = ident.split('/').collect();
    let (codename, special_support) = match parts.len() {
        1 => {
            let codename = parts[0]
                .split('_')
                .next()
                .unwrap_or(parts[0])
                .to_string();
            (codename, String::new())
        }
        2 => {
            let (a, b) = (parts[0], parts[1]);
            let b_codename = b.split('_').next().unwrap_or(b);
            if is_known_codename(a) && is_special_support(b_codename) {
                (a.to_string(), b_codename.to_string())
            } else if is_known_codename(b_codename) && is_special_support(a) {
                (b_codename.to_string(), a.to_string())
            } else if is_known_codename(a) {
                return Err(CorpusError::UnknownSpecialSupport(ident.to_string()));
            } else {
                return Err(CorpusError::NoKnownCodenameInToken(ident.to_string()));
            }
        }
        _ => return Err(CorpusError::TooManySlashParts(ident.to_string())),
    };

    let rest: Vec<&str> = tokens.collect();
    let affected = rest.first().copied().unwrap_or("").to_string();
    let sub_info = rest.get(1..).unwrap_or(&[]).join(" ");

    let key = if special_support.is_empty() {
        codename
    } else {
        format!("{codename}/{special_support}")
    };
    patch_data
        .per_version
        .insert(key, PerVersionEntry { affected, sub_info });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Candidate: CVE-2024-0001
PublicDate: 2024-01-01
References:
 https://example.com/a
 https://example.com/b
Description:
 An example description
 spanning two lines.
Notes:
 someone> a note
Discovered-by: Jane Doe
Priority: medium
CVSS:

Patches_libfoo:
upstream: https://github.com/owner/repo/commit/abc123 fix
jammy_libfoo: needed
focal/esm_libfoo: not-affected
";

    #[test]
    fn meta_region_fields_are_assigned() {
        let cve = parse_cve_file(SAMPLE).unwrap();
        assert_eq!(cve.candidate, "CVE-2024-0001");
        assert_eq!(cve.public_date, "2024-01-01");
        assert_eq!(cve.references, vec!["https://example.com/a", "https://example.com/b"]);
        assert!(cve.description.contains("spanning two lines"));
        assert_eq!(cve.discovered_by, "Jane Doe");
        assert_eq!(cve.priority, "medium");
    }

    #[test]
    fn patches_region_collects_upstream_url_and_per_version() {
        let cve = parse_cve_file(SAMPLE).unwrap();
        let patch = &cve.patches["libfoo"];
        assert_eq!(
            patch.upstream_urls,
            vec!["https://github.com/owner/repo/commit/abc123".to_string()]
        );
        assert_eq!(patch.per_version["jammy"].affected, "needed");
        assert_eq!(patch.per_version["focal/esm"].affected, "not-affected");
    }

    #[test]
    fn misspelled_upstream_prefix_is_tolerated() {
        let input = "Candidate: CVE-2024-0002\nCVSS:\n\nPatches_bar:\nusptream: https://example.com/c\n";
        let cve = parse_cve_file(input).unwrap();
        assert_eq!(cve.patches["bar"].upstream_urls, vec!["https://example.com/c"]);
    }

    #[test]
    fn two_part_token_with_reversed_order_is_accepted() {
        let input = "Candidate: CVE-2024-0003\nCVSS:\n\nPatches_baz:\nesm/trusty_baz: needed\n";
        let cve = parse_cve_file(input).unwrap();
        assert!(cve.patches["baz"].per_version.contains_key("trusty/esm"));
    }

    #[test]
    fn three_slash_parts_is_fatal() {
        let input = "Candidate: CVE-2024-0004\nCVSS:\n\nPatches_qux:\na/b/c_qux: needed\n";
        assert!(parse_cve_file(input).is_err());
    }

    #[test]
    fn unrecognized_meta_key_is_fatal() {
        let input = "Candidate: CVE-2024-0005\nAssigner: someone\nCVSS:\n";
        assert!(parse_cve_file(input).is_err());
    }

    #[test]
    fn break_fix_lines_are_ignored() {
        let input = "Candidate: CVE-2024-0006\nCVSS:\n\nPatches_quux:\nsomething break-fix:\njammy_quux: needed\n";
        let cve = parse_cve_file(input).unwrap();
        assert_eq!(cve.patches["quux"].per_version.len(), 1);
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_cve_file(SAMPLE).unwrap();
        let second = parse_cve_file(SAMPLE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn round_trips_through_json() {
        let cve = parse_cve_file(SAMPLE).unwrap();
        let json = serde_json::to_string(&cve).unwrap();
        let back: UbuntuCve = serde_json::from_str(&json).unwrap();
        assert_eq!(cve, back);
    }
}

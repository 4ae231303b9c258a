//! Free-form textual report, per §6: one header line per source package
//! with any exploitable CVE, followed by its space-separated candidate ids.

use goscan_vulndb::UbuntuCve;
use std::collections::HashMap;

/// Render the final report. Source-package ordering is not guaranteed by
/// the pipeline, but is sorted here for a stable, readable report; CVEs
/// within a source keep the insertion order they arrived in.
pub fn format_report(findings: &HashMap<String, Vec<UbuntuCve>>) -> String {
    let mut sources: Vec<&String> = findings
        .iter()
        .filter(|(_, cves)| !cves.is_empty())
        .map(|(source, _)| source)
        .collect();
    sources.sort();

    let mut out = String::new();
    for source in sources {
        let cves = &findings[source];
        out.push_str(source);
        out.push('\n');
        let ids: Vec<&str> = cves.iter().map(|c| c.candidate.as_str()).collect();
        out.push_str(&ids.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cve(id: &str) -> UbuntuCve {
        UbuntuCve {
            candidate: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn sources_with_no_findings_are_omitted() {
        let mut findings = HashMap::new();
        findings.insert("libfoo".to_string(), vec![]);
        findings.insert("libbar".to_string(), vec![cve("CVE-2024-0001")]);
        let report = format_report(&findings);
        assert!(!report.contains("libfoo"));
        assert!(report.contains("libbar"));
        assert!(report.contains("CVE-2024-0001"));
    }

    #[test]
    fn multiple_candidates_are_space_separated() {
        let mut findings = HashMap::new();
        findings.insert(
            "libbaz".to_string(),
            vec![cve("CVE-2024-0002"), cve("CVE-2024-0003")],
        );
        let report = format_report(&findings);
        assert_eq!(report, "libbaz\nCVE-2024-0002 CVE-2024-0003\n");
    }

    #[test]
    fn empty_findings_produce_empty_report() {
        assert_eq!(format_report(&HashMap::new()), "");
    }
}

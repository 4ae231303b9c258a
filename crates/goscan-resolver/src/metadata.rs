use crate::error::{Result, ResolverError};

/// A binary package's identifying metadata, as reported by `apt-cache show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPackage {
    pub name: String,
    pub version: String,
    pub source_name: String,
}

/// Reduce a raw `apt-cache show` dump to just the lines a downstream
/// parser needs, mirroring piping through `grep -E 'Package:|Version:|Source:'`.
pub fn filter_package_lines(raw: &str) -> String {
    raw.lines()
        .filter(|line| {
            line.starts_with("Package:") || line.starts_with("Version:") || line.starts_with("Source:")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse filtered `apt-cache show` records into [`BinaryPackage`]s.
///
/// Each record is a fixed four-step sequence, walked by line index exactly
/// as upstream's `AptShow` does:
///
/// 1. `Package: <name>` (required); `source_name` defaults to `name`.
/// 2. If the next line is `Version:`, assign it.
/// 3. If the line after that is `Source:`, its first whitespace-separated
///    token overrides `source_name`; a trailing `(version)` is discarded,
///    never parsed into `version`.
/// 4. If the line after that is `Version:`, it overrides the version
///    assigned in step 2.
///
/// A record that does not begin with `Package:` is a contract violation.
pub fn parse_metadata(input: &str) -> Result<Vec<BinaryPackage>> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();

    let mut packages = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        let Some(name) = line.strip_prefix("Package:") else {
            return Err(ResolverError::MetadataContractViolation(line.to_string()));
        };
        let name = name.trim().to_string();
        let mut pkg = BinaryPackage {
            name: name.clone(),
            version: String::new(),
            source_name: name,
        };
        idx += 1;

        if let Some(version) = lines.get(idx).and_then(|l| l.strip_prefix("Version:")) {
            pkg.version = version.trim().to_string();
            idx += 1;
        }

        if let Some(source) = lines.get(idx).and_then(|l| l.strip_prefix("Source:")) {
            if let Some(token) = source.trim().split_whitespace().next() {
                pkg.source_name = token.to_string();
            }
            idx += 1;
        }

        if let Some(version) = lines.get(idx).and_then(|l| l.strip_prefix("Version:")) {
            pkg.version = version.trim().to_string();
            idx += 1;
        }

        packages.push(pkg);
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_with_only_version_defaults_source_to_name() {
        let input = "Package: libfoo1\nVersion: 1.2-3\n";
        let pkgs = parse_metadata(input).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "libfoo1");
        assert_eq!(pkgs[0].version, "1.2-3");
        assert_eq!(pkgs[0].source_name, "libfoo1");
    }

    #[test]
    fn source_line_overrides_source_name_only() {
        let input = "Package: libfoo1\nVersion: 1.2-3\nSource: foo\n";
        let pkgs = parse_metadata(input).unwrap();
        assert_eq!(pkgs[0].source_name, "foo");
        assert_eq!(pkgs[0].version, "1.2-3");
    }

    #[test]
    fn version_after_source_overrides_earlier_version() {
        let input = "Package: libfoo1\nVersion: 1.2-3\nSource: foo\nVersion: 1.0-1\n";
        let pkgs = parse_metadata(input).unwrap();
        assert_eq!(pkgs[0].source_name, "foo");
        assert_eq!(pkgs[0].version, "1.0-1");
    }

    #[test]
    fn source_line_with_apt_style_parenthetical_keeps_only_the_name_token() {
        let input = "Package: libfoo1\nVersion: 1.2-3\nSource: foo (1.0-1)\n";
        let pkgs = parse_metadata(input).unwrap();
        assert_eq!(pkgs[0].source_name, "foo");
        assert_eq!(pkgs[0].version, "1.2-3");
    }

    #[test]
    fn multiple_records_are_split_on_package_lines() {
        let input = "Package: a\nVersion: 1\nPackage: b\nVersion: 2\n";
        let pkgs = parse_metadata(input).unwrap();
        assert_eq!(pkgs.len(), 2);
        assert_eq!(pkgs[0].name, "a");
        assert_eq!(pkgs[1].name, "b");
    }

    #[test]
    fn record_not_starting_with_package_is_a_contract_violation() {
        let input = "Version: 1.2-3\n";
        assert!(parse_metadata(input).is_err());
    }

    #[test]
    fn filter_drops_unrelated_lines() {
        let raw = "Package: a\nDescription: something\nVersion: 1\nMaintainer: x\n";
        let filtered = filter_package_lines(raw);
        assert_eq!(filtered, "Package: a\nVersion: 1");
    }
}

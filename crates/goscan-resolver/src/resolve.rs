use crate::deadline::with_deadline;
use crate::error::{Result, ResolverError};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A query against `dpkg -S`: given a batch of paths, returns the raw
/// stdout (resolved-package lines) and stderr (no-owner lines).
///
/// Implemented for any `Fn(&[String]) -> Result<(String, String)>`, so
/// tests can script responses without shelling out; [`crate::process`]
/// provides the real `dpkg` invocation.
#[async_trait::async_trait]
pub trait DpkgQuery: Sync {
    async fn query(&self, paths: &[String]) -> Result<(String, String)>;
}

#[async_trait::async_trait]
impl<F> DpkgQuery for F
where
    F: Fn(&[String]) -> Result<(String, String)> + Sync,
{
    async fn query(&self, paths: &[String]) -> Result<(String, String)> {
        self(paths)
    }
}

/// Map observed library paths to the binary packages that own them, via
/// the iterative path-escalation algorithm in §4.2.
///
/// Returns binary-package-name → the original observed paths attributable
/// to it. Every resolvable observed path appears exactly once. Provenance
/// is never fabricated: every path in the output traces back to the
/// initial `observed` set.
///
/// Aborts with [`ResolverError::Cancelled`] if `cancel` fires, or
/// [`ResolverError::CommandTimedOut`] if a single probe exceeds `timeout` —
/// either way nothing partial is returned.
pub async fn resolve_packages<Q: DpkgQuery>(
    observed: &HashSet<String>,
    query: &Q,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<HashMap<String, Vec<String>>> {
    let mut provenance: HashMap<String, Vec<String>> = observed
        .iter()
        .map(|p| (p.clone(), vec![p.clone()]))
        .collect();
    let mut bin_pkgs: HashMap<String, Vec<String>> = HashMap::new();
    let mut probe_set: HashSet<String> = observed.clone();

    while !probe_set.is_empty() {
        let batch: Vec<String> = probe_set.iter().cloned().collect();
        debug!(batch_size = batch.len(), "probing dpkg");
        let (stdout, stderr) =
            with_deadline("dpkg -S", timeout, cancel, query.query(&batch)).await?;

        let mut next_probe_set = HashSet::new();

        for line in stdout.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.contains("dpkg-query: no path") {
                return Err(ResolverError::UnexpectedNoPathOnStdout(line.to_string()));
            }
            handle_stdout_line(line, &mut provenance, &mut bin_pkgs, &mut next_probe_set)?;
        }

        for line in stderr.lines() {
            if line.trim().is_empty() {
                continue;
            }
            handle_stderr_line(line, &mut provenance, &mut next_probe_set)?;
        }

        probe_set = next_probe_set;
    }

    Ok(bin_pkgs)
}

fn handle_stdout_line(
    line: &str,
    provenance: &mut HashMap<String, Vec<String>>,
    bin_pkgs: &mut HashMap<String, Vec<String>>,
    next_probe_set: &mut HashSet<String>,
) -> Result<()> {
    // dpkg -S separates the owning-package list from the path with the
    // last ": " in the line; individual packages are comma-separated and
    // may carry a `:arch` suffix, e.g. "libfoo:amd64, liboof:amd64: /lib/foo.so".
    let (head, path) = line
        .rsplit_once(": ")
        .ok_or_else(|| ResolverError::MissingProvenance(line.to_string()))?;
    let path = path.trim().to_string();
    let packages: Vec<&str> = head
        .split(',')
        .map(|p| p.trim().split(':').next().unwrap_or(p.trim()))
        .collect();

    if packages.len() > 1 {
        if path.starts_with("/usr") || path.starts_with("/etc") {
            // Genuinely shared content — accept it under every owning
            // package rather than re-probing forever.
            let prov_paths = provenance
                .remove(&path)
                .ok_or_else(|| ResolverError::MissingProvenance(path.clone()))?;
            for pkg in packages {
                bin_pkgs
                    .entry(pkg.to_string())
                    .or_default()
                    .extend(prov_paths.iter().cloned());
            }
        } else {
            let prov_paths = provenance
                .remove(&path)
                .ok_or_else(|| ResolverError::MissingProvenance(path.clone()))?;
            let escalated = format!("/usr{path}");
            provenance
                .entry(escalated.clone())
                .or_default()
                .extend(prov_paths);
            next_probe_set.insert(escalated);
        }
    } else {
        let prov_paths = provenance
            .remove(&path)
            .ok_or_else(|| ResolverError::MissingProvenance(path.clone()))?;
        bin_pkgs
            .entry(packages[0].to_string())
            .or_default()
            .extend(prov_paths);
    }

    Ok(())
}

fn handle_stderr_line(
    line: &str,
    provenance: &mut HashMap<String, Vec<String>>,
    next_probe_set: &mut HashSet<String>,
) -> Result<()> {
    let path = line
        .split_whitespace()
        .last()
        .ok_or_else(|| ResolverError::MissingProvenance(line.to_string()))?
        .to_string();

    let prov_paths = provenance
        .remove(&path)
        .ok_or_else(|| ResolverError::MissingProvenance(path.clone()))?;

    match path.rfind('/') {
        None => {
            warn!(path, "no path separator left, dropping unresolvable path");
        }
        Some(idx) => {
            let parent = &path[..idx];
            if parent.is_empty() {
                warn!(path, "reached filesystem root, dropping unresolvable path");
            } else {
                provenance
                    .entry(parent.to_string())
                    .or_default()
                    .extend(prov_paths);
                next_probe_set.insert(parent.to_string());
            }
        }
    }

    Ok(())
}

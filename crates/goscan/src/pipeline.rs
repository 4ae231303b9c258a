//! Orchestrates the scan: trace, resolve, cross-reference, report.
//!
//! This module is deliberately thin — each step delegates to the crate
//! that owns the corresponding piece of SPEC_FULL.md, and this function
//! only wires their outputs together in the order §4 describes.

use crate::cli::Cli;
use crate::error::ScanError;
use crate::tracer;
use goscan_core::{GoscanConfig, UbuntuVersion};
use goscan_exploit::filter_exploitable;
use goscan_patches::GitPatchLocator;
use goscan_resolver::{apt_cache_show, filter_package_lines, parse_metadata, resolve_packages, ProcessDpkgQuery};
use goscan_trace::parse_strace;
use goscan_vulndb::{ingest_corpus, UbuntuCve, VulnStore};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Build a [`GoscanConfig`] from the environment, then apply any CLI
/// overrides — the CLI flags win when present.
pub fn build_config(cli: &Cli) -> GoscanConfig {
    let mut config = GoscanConfig::from_env();
    if let Some(cache_dir) = &cli.cache_dir {
        config.cache_dir = cache_dir.clone();
    }
    if let Some(corpus_dir) = &cli.corpus_dir {
        config.corpus_dir = corpus_dir.clone();
    }
    if cli.codename.is_some() {
        config.codename = cli.codename.clone();
    }
    config
}

/// Run the full scan pipeline and return the rendered report text.
///
/// `cancel` is checked before every remaining stage can start, and every
/// external invocation inside a stage races it against `config.command_timeout`
/// — on cancellation, this returns [`ScanError::Cancelled`] without
/// persisting any partial result.
pub async fn run(
    cli: Cli,
    config: GoscanConfig,
    cancel: CancellationToken,
) -> Result<String, ScanError> {
    let timeout = config.command_timeout;

    if config.rebuild_db {
        info!(corpus_dir = %config.corpus_dir.display(), "rebuilding vuln store");
        let cves = ingest_corpus(&config.corpus_dir)?;
        let mut store = VulnStore::open(&config.store_path())?;
        store.rebuild(&cves)?;
    }

    if !config.strace_enabled {
        info!("GOSCAN_STRACE not enabled, nothing to scan");
        return Ok(String::new());
    }

    check_cancelled(&cancel, "strace")?;
    let trace_output = tracer::run_strace(&cli.target, &config.cache_dir, &cancel, timeout).await?;
    let observed_paths = parse_strace(&trace_output)?;
    info!(count = observed_paths.len(), "observed shared-library paths");

    check_cancelled(&cancel, "dpkg -S")?;
    let bin_pkgs = resolve_packages(&observed_paths, &ProcessDpkgQuery, &cancel, timeout).await?;

    let mut paths_by_source: HashMap<String, HashSet<String>> = HashMap::new();
    for (bin_pkg, paths) in &bin_pkgs {
        check_cancelled(&cancel, "apt-cache show")?;
        let source = source_package_for(bin_pkg, &cancel, timeout).await?;
        paths_by_source
            .entry(source)
            .or_default()
            .extend(paths.iter().cloned());
    }

    check_cancelled(&cancel, "lsb_release")?;
    let codename = match config.codename.clone() {
        Some(codename) => codename,
        None => tracer::detect_codename(&cancel, timeout).await?,
    };
    let host_version = UbuntuVersion::new(codename);

    let store = VulnStore::open(&config.store_path())?;
    let mut candidates_by_source: HashMap<String, Vec<UbuntuCve>> = HashMap::new();
    for source in paths_by_source.keys() {
        let cves = store.cves_for_source(source)?;
        candidates_by_source.insert(source.clone(), cves);
    }

    let all_upstream_urls: Vec<String> = candidates_by_source
        .values()
        .flatten()
        .flat_map(|cve| cve.patches.values())
        .flat_map(|patch| patch.upstream_urls.iter().cloned())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    check_cancelled(&cancel, "GitHub patch lookup")?;
    let fixed_files_by_url = if all_upstream_urls.is_empty() {
        HashMap::new()
    } else {
        let locator = Arc::new(GitPatchLocator::new(config.github_token.as_deref())?);
        goscan_patches::resolve_many(locator, all_upstream_urls, cancel.clone(), timeout).await
    };

    check_cancelled(&cancel, "findings assembly")?;
    let mut findings: HashMap<String, Vec<UbuntuCve>> = HashMap::new();
    for (source, observed) in &paths_by_source {
        let Some(candidates) = candidates_by_source.get(source) else {
            continue;
        };
        let exploitable = filter_exploitable(
            &host_version,
            source,
            observed,
            candidates,
            &fixed_files_by_url,
        );
        if !exploitable.is_empty() {
            findings.insert(source.clone(), exploitable);
        }
    }

    Ok(crate::report::format_report(&findings))
}

/// Fails fast with [`ScanError::Cancelled`] rather than starting another
/// external-command stage once cancellation has been requested.
fn check_cancelled(cancel: &CancellationToken, next_step: &str) -> Result<(), ScanError> {
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled {
            command: next_step.to_string(),
        });
    }
    Ok(())
}

async fn source_package_for(
    bin_pkg: &str,
    cancel: &CancellationToken,
    timeout: std::time::Duration,
) -> Result<String, ScanError> {
    let raw = apt_cache_show(bin_pkg, cancel, timeout)
        .await
        .map_err(|err| map_resolver_err(err, bin_pkg))?;
    let filtered = filter_package_lines(&raw);
    let packages = parse_metadata(&filtered)?;
    match packages.first() {
        Some(pkg) => Ok(pkg.source_name.clone()),
        None => {
            warn!(bin_pkg, "apt-cache show returned no record, using binary package name as source");
            Ok(bin_pkg.to_string())
        }
    }
}

fn map_resolver_err(err: goscan_resolver::ResolverError, bin_pkg: &str) -> ScanError {
    warn!(bin_pkg, %err, "apt-cache show failed for binary package");
    ScanError::Resolver(err)
}

use crate::deadline::with_deadline;
use crate::error::{Result, ResolverError};
use crate::resolve::DpkgQuery;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Invokes the real `dpkg -S` binary.
///
/// Accepts a non-zero exit status as a normal outcome, since `dpkg -S`
/// exits non-zero whenever any queried path is unowned — the per-path
/// "no path" diagnostics on stderr are the expected signal, not a
/// command failure.
///
/// Carries no deadline of its own: [`crate::resolve::resolve_packages`]
/// already races every `query()` call against its own `cancel`/`timeout`
/// arguments, so wrapping here too would just double the same race.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessDpkgQuery;

#[async_trait::async_trait]
impl DpkgQuery for ProcessDpkgQuery {
    async fn query(&self, paths: &[String]) -> Result<(String, String)> {
        run_dpkg(paths).await
    }
}

async fn run_dpkg(paths: &[String]) -> Result<(String, String)> {
    debug!(count = paths.len(), "invoking dpkg -S");
    let output = Command::new("dpkg")
        .arg("-S")
        .args(paths)
        .output()
        .await
        .map_err(|source| ResolverError::CommandFailed {
            command: "dpkg -S".to_string(),
            source,
        })?;
    Ok((
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    ))
}

/// Invokes `apt-cache show <package>` for a single binary package, racing
/// it against `timeout` and `cancel`.
pub async fn apt_cache_show(
    package: &str,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<String> {
    let command = format!("apt-cache show {package}");
    with_deadline(&command, timeout, cancel, run_apt_cache_show(package)).await
}

async fn run_apt_cache_show(package: &str) -> Result<String> {
    debug!(package, "invoking apt-cache show");
    let output = Command::new("apt-cache")
        .arg("show")
        .arg(package)
        .output()
        .await
        .map_err(|source| ResolverError::CommandFailed {
            command: format!("apt-cache show {package}"),
            source,
        })?;
    if !output.status.success() {
        return Err(ResolverError::CommandNonZero {
            command: format!("apt-cache show {package}"),
            status: output.status.code().unwrap_or(-1),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

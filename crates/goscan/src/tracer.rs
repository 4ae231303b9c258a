//! Invokes the external commands named in §6: `file`, the system-call and
//! library-call tracers, `lsb_release`.

use crate::error::ScanError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs `file <path>` and reports whether the classifier called the
/// binary dynamically linked.
pub async fn is_dynamically_linked(
    path: &str,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<bool, ScanError> {
    let output = run("file", &[path], cancel, timeout).await?;
    Ok(output.contains("dynamically linked"))
}

/// Runs the target under `strace`, recording only `openat` calls and
/// following children, with a generous string-length cap so long paths
/// aren't truncated. Returns the tracer's stderr output (where strace
/// writes syscall records by default) and removes the temporary trace
/// file it wrote to `cache_dir` on success.
pub async fn run_strace(
    target: &[String],
    cache_dir: &Path,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<String, ScanError> {
    let trace_file = cache_dir.join("goscan-strace.log");
    let command = "strace";
    let status = with_deadline(command, cancel, timeout, async {
        Command::new(command)
            .args(["-f", "-e", "trace=openat", "-s", "1000", "-o"])
            .arg(&trace_file)
            .arg("--")
            .args(target)
            .status()
            .await
            .map_err(|source| ScanError::ExternalCommand {
                command: command.to_string(),
                source,
            })
    })
    .await?;

    if !status.success() {
        return Err(ScanError::ExternalCommandFailed {
            command: command.to_string(),
            status: status.code().unwrap_or(-1),
        });
    }

    let contents = std::fs::read_to_string(&trace_file)?;
    let _ = std::fs::remove_file(&trace_file);
    Ok(contents)
}

/// Runs the target under `ltrace`, recording library calls.
pub async fn run_ltrace(
    target: &[String],
    cache_dir: &Path,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<String, ScanError> {
    let trace_file = cache_dir.join("goscan-ltrace.log");
    let command = "ltrace";
    let status = with_deadline(command, cancel, timeout, async {
        Command::new(command)
            .args(["-f", "-s", "1000", "-o"])
            .arg(&trace_file)
            .arg("--")
            .args(target)
            .status()
            .await
            .map_err(|source| ScanError::ExternalCommand {
                command: command.to_string(),
                source,
            })
    })
    .await?;

    if !status.success() {
        return Err(ScanError::ExternalCommandFailed {
            command: command.to_string(),
            status: status.code().unwrap_or(-1),
        });
    }

    let contents = std::fs::read_to_string(&trace_file)?;
    let _ = std::fs::remove_file(&trace_file);
    Ok(contents)
}

/// Parses `Codename:` out of `lsb_release -a` output.
pub async fn detect_codename(
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<String, ScanError> {
    let output = run("lsb_release", &["-a"], cancel, timeout).await?;
    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("Codename:") {
            return Ok(rest.trim().to_string());
        }
    }
    Err(ScanError::UnknownHostCodename)
}

async fn run(
    command: &str,
    args: &[&str],
    cancel: &CancellationToken,
    timeout: Duration,
) -> Result<String, ScanError> {
    debug!(command, ?args, "invoking external command");
    with_deadline(command, cancel, timeout, async {
        let output = Command::new(command)
            .args(args)
            .output()
            .await
            .map_err(|source| ScanError::ExternalCommand {
                command: command.to_string(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    })
    .await
}

/// Races `fut` against `cancel` and `timeout`, the deadline policy every
/// external invocation in this crate is subject to.
async fn with_deadline<T, F>(
    command: &str,
    cancel: &CancellationToken,
    timeout: Duration,
    fut: F,
) -> Result<T, ScanError>
where
    F: std::future::Future<Output = Result<T, ScanError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(ScanError::Cancelled { command: command.to_string() }),
        outcome = tokio::time::timeout(timeout, fut) => match outcome {
            Ok(inner) => inner,
            Err(_) => Err(ScanError::CommandTimedOut { command: command.to_string(), timeout }),
        },
    }
}

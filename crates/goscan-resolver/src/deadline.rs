//! Shared timeout/cancellation wrapper for this crate's external-process
//! calls, so `resolve.rs` and `process.rs` apply the same deadline policy.

use crate::error::{Result, ResolverError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs `fut`, failing with [`ResolverError::Cancelled`] if `cancel` fires
/// first, or [`ResolverError::CommandTimedOut`] if `timeout` elapses first.
pub(crate) async fn with_deadline<T, F>(
    command: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(ResolverError::Cancelled {
            command: command.to_string(),
        }),
        outcome = tokio::time::timeout(timeout, fut) => match outcome {
            Ok(inner) => inner,
            Err(_) => Err(ResolverError::CommandTimedOut {
                command: command.to_string(),
                timeout,
            }),
        },
    }
}

//! Resolves many patch URLs concurrently, bounded per §5's recommended
//! 4–8 in-flight requests.

use crate::locator::GitPatchLocator;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

const MAX_IN_FLIGHT: usize = 6;

/// Resolve `urls` against `locator` with bounded concurrency.
///
/// A URL whose resolution fails (unknown host, unrecognized shape,
/// exhausted rate-limit retries) is omitted from the result map rather
/// than failing the whole batch — per §4.7, the caller folds a missing
/// entry into "no fixed files known" for that URL. If `cancel` fires
/// while requests are in flight, the batch stops waiting on outstanding
/// tasks and returns only what had already resolved.
pub async fn resolve_many(
    locator: Arc<GitPatchLocator>,
    urls: Vec<String>,
    cancel: CancellationToken,
    timeout: Duration,
) -> HashMap<String, HashSet<String>> {
    let semaphore = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut tasks = JoinSet::new();

    for url in urls {
        let locator = Arc::clone(&locator);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let result = locator.files(&url, &cancel, timeout).await;
            (url, result)
        });
    }

    let mut resolved = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        let Ok((url, result)) = joined else {
            continue;
        };
        match result {
            Ok(files) => {
                resolved.insert(url, files);
            }
            Err(err) => {
                info!(url, %err, "patch url not resolvable, treating as no fixed files");
            }
        }
    }

    resolved
}

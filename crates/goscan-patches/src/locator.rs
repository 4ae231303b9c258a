//! Resolves a patch-reference URL to the set of file paths it touches, via
//! the GitHub REST API.

use crate::error::{PatchError, Result};
use crate::url_shape::{parse_patch_url, PatchRef};
use governor::{Quota, RateLimiter};
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type Limiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A reused, rate-limited GitHub REST client, constructed once per
/// process and shared across requests.
pub struct GitPatchLocator {
    client: octocrab::Octocrab,
    limiter: Arc<Limiter>,
}

impl GitPatchLocator {
    /// Build a locator authenticated with `token`, if one is present.
    /// Without a token, requests still work but are subject to GitHub's
    /// much lower unauthenticated rate limit.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut builder = octocrab::Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }
        let client = builder.build()?;

        // Conservative: stays well under GitHub's authenticated 5000/hour
        // limit even with several locators sharing a process.
        let quota = Quota::per_minute(NonZeroU32::new(60).unwrap());
        let limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self { client, limiter })
    }

    /// The file paths touched by the commit or PR the URL refers to.
    ///
    /// Returns [`PatchError::UnknownHost`] or
    /// [`PatchError::UnrecognizedUrlShape`] for URLs the caller should
    /// treat as contributing no fixed files (§4.7 step 4) rather than
    /// aborting the scan. Aborts with [`PatchError::Cancelled`] if
    /// `cancel` fires, or [`PatchError::TimedOut`] if a single request
    /// (including its rate-limit backoff) exceeds `timeout`.
    pub async fn files(
        &self,
        url: &str,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<HashSet<String>> {
        match parse_patch_url(url)? {
            PatchRef::Commit { owner, repo, sha } => {
                self.commit_files(&owner, &repo, &sha, url, cancel, timeout).await
            }
            PatchRef::PullRequest {
                owner,
                repo,
                number,
            } => {
                self.pull_request_files(&owner, &repo, number, url, cancel, timeout)
                    .await
            }
        }
    }

    async fn commit_files(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        url: &str,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<HashSet<String>> {
        let commit = self
            .with_rate_limit(url, cancel, timeout, || self.client.commits(owner, repo).get(sha))
            .await?;
        Ok(commit
            .files
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.filename)
            .collect())
    }

    async fn pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        url: &str,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<HashSet<String>> {
        let mut filenames = HashSet::new();
        let mut page = self
            .with_rate_limit(url, cancel, timeout, || {
                self.client.pulls(owner, repo).list_files(number).send()
            })
            .await?;

        loop {
            filenames.extend(page.items.iter().map(|f| f.filename.clone()));
            let next = with_deadline(url, cancel, timeout, self.client.get_page(&page.next)).await?;
            match next {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(filenames)
    }

    /// Applies the process-wide rate limiter before the request, then
    /// retries transient (secondary-rate-limit) failures with a jittered
    /// exponential backoff, matching §5's "no retry logic except Git API
    /// rate limits" rule. The whole attempt loop, backoff included, is
    /// bounded by a single `timeout`/`cancel` deadline.
    async fn with_rate_limit<T, F, Fut>(
        &self,
        url: &str,
        cancel: &CancellationToken,
        timeout: Duration,
        request: F,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, octocrab::Error>>,
    {
        with_deadline(url, cancel, timeout, async {
            const MAX_ATTEMPTS: u32 = 5;
            let mut attempt = 0;
            loop {
                self.limiter.until_ready().await;
                match request().await {
                    Ok(value) => return Ok(value),
                    Err(err) if is_rate_limited(&err) && attempt < MAX_ATTEMPTS => {
                        attempt += 1;
                        let backoff_ms = 2u64.pow(attempt) * 100;
                        let jitter_ms: u64 = rand::random::<u64>() % backoff_ms.max(1);
                        warn!(attempt, backoff_ms, "GitHub API rate limited, backing off");
                        tokio::time::sleep(Duration::from_millis(backoff_ms + jitter_ms)).await;
                    }
                    Err(err) if attempt >= MAX_ATTEMPTS => {
                        info!("rate limit retries exhausted, treating as no fixed files");
                        return Err(PatchError::RateLimitExhausted(err.to_string()));
                    }
                    Err(err) => return Err(PatchError::Api(err)),
                }
            }
        })
        .await
    }
}

/// Races `fut` against `cancel` and `timeout`, the same deadline policy
/// every external call in this crate is subject to.
async fn with_deadline<T, F>(
    url: &str,
    cancel: &CancellationToken,
    timeout: Duration,
    fut: F,
) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(PatchError::Cancelled { url: url.to_string() }),
        outcome = tokio::time::timeout(timeout, fut) => match outcome {
            Ok(inner) => inner,
            Err(_) => Err(PatchError::TimedOut { url: url.to_string(), timeout }),
        },
    }
}

fn is_rate_limited(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.message.to_lowercase().contains("rate limit")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_builds_with_and_without_a_token() {
        assert!(GitPatchLocator::new(Some("test-token")).is_ok());
        assert!(GitPatchLocator::new(None).is_ok());
    }
}

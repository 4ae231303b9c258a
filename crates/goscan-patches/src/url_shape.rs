//! Recognizes the two URL shapes §4.6 defines, independent of any network
//! access, so the shape-matching logic can be unit tested directly.

use crate::error::{PatchError, Result};

/// A parsed reference to either a single commit or a pull request on some
/// Git-hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchRef {
    Commit {
        owner: String,
        repo: String,
        sha: String,
    },
    PullRequest {
        owner: String,
        repo: String,
        number: u64,
    },
}

/// Parse a patch-reference URL. Only `github.com` is a resolvable host;
/// any other host is reported distinctly from an unrecognized path shape
/// so callers can apply §4.7's "not a known Git-hosting domain" leniency.
pub fn parse_patch_url(raw: &str) -> Result<PatchRef> {
    let url = url::Url::parse(raw).map_err(|_| PatchError::UnrecognizedUrlShape(raw.to_string()))?;

    let host = url
        .host_str()
        .ok_or_else(|| PatchError::UnrecognizedUrlShape(raw.to_string()))?;
    if host != "github.com" {
        return Err(PatchError::UnknownHost(host.to_string()));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [owner, repo, "commit", sha, ..] => Ok(PatchRef::Commit {
            owner: owner.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
        }),
        [owner, repo, "pull", number, ..] => {
            let number = number
                .parse::<u64>()
                .map_err(|_| PatchError::UnrecognizedUrlShape(raw.to_string()))?;
            Ok(PatchRef::PullRequest {
                owner: owner.to_string(),
                repo: repo.to_string(),
                number,
            })
        }
        _ => Err(PatchError::UnrecognizedUrlShape(raw.to_string())),
    }
}

/// Whether `raw` has a host this crate knows how to resolve against,
/// independent of whether its path also matches a recognized shape.
pub fn is_known_git_host(raw: &str) -> bool {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "github.com"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_url_is_parsed() {
        let parsed = parse_patch_url("https://github.com/owner/repo/commit/abc123def").unwrap();
        assert_eq!(
            parsed,
            PatchRef::Commit {
                owner: "owner".to_string(),
                repo: "repo".to_string(),
                sha: "abc123def".to_string(),
            }
        );
    }

    #[test]
    fn pull_request_url_with_commits_tail_is_stripped() {
        let parsed =
            parse_patch_url("https://github.com/owner/repo/pull/42/commits/abc123def").unwrap();
        assert_eq!(
            parsed,
            PatchRef::PullRequest {
                owner: "owner".to_string(),
                repo: "repo".to_string(),
                number: 42,
            }
        );
    }

    #[test]
    fn plain_pull_request_url_is_parsed() {
        let parsed = parse_patch_url("https://github.com/owner/repo/pull/7").unwrap();
        assert_eq!(
            parsed,
            PatchRef::PullRequest {
                owner: "owner".to_string(),
                repo: "repo".to_string(),
                number: 7,
            }
        );
    }

    #[test]
    fn non_github_host_is_reported_as_unknown_host() {
        let err = parse_patch_url("https://git.launchpad.net/owner/repo/commit/abc").unwrap_err();
        assert!(matches!(err, PatchError::UnknownHost(_)));
    }

    #[test]
    fn unrecognized_shape_is_an_error() {
        let err = parse_patch_url("https://github.com/owner/repo/tree/main").unwrap_err();
        assert!(matches!(err, PatchError::UnrecognizedUrlShape(_)));
    }
}

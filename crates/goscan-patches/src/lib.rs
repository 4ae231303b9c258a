//! Resolves upstream patch-reference URLs (commit or pull-request) to the
//! file paths they touch, via the GitHub REST API.
//!
//! [`url_shape`] is pure and synchronous — it only needs to recognize a
//! URL's shape — while [`locator::GitPatchLocator`] and [`batch`] perform
//! the actual network calls and are the only async surface in this
//! workspace.

pub mod batch;
pub mod error;
pub mod locator;
pub mod url_shape;

pub use batch::resolve_many;
pub use error::{PatchError, Result};
pub use locator::GitPatchLocator;
pub use url_shape::{is_known_git_host, parse_patch_url, PatchRef};

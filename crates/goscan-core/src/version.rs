//! Ubuntu release / special-support identifiers.
//!
//! The CVE corpus's `Patches_<source>:` blocks key per-version affection
//! records by a `<codename>[/<special-support>]` token. Both halves are
//! drawn from closed sets; an implementation that doesn't track both sets
//! explicitly silently mis-parses the tail end of the Debian/Ubuntu
//! security tracker's oldest and newest releases.

use serde::{Deserialize, Serialize};

/// The closed set of non-empty "special support" markers a codename may be
/// qualified with (`trusty/esm`, `xenial/fips`, ...).
pub const SPECIAL_SUPPORTS: &[&str] = &[
    "esm",
    "esm-apps",
    "esm-infra",
    "fips",
    "fips-updates",
    "ros-esm",
    "stable-phone-overlay",
    "ubuntu-core",
];

/// The closed set of Ubuntu release codenames (plus the two pseudo-codenames
/// `devel` and `upstream`, and the `snap` package-manager pseudo-release)
/// the corpus is known to reference.
pub const KNOWN_CODENAMES: &[&str] = &[
    "warty",
    "hoary",
    "breezy",
    "dapper",
    "edgy",
    "feisty",
    "gutsy",
    "hardy",
    "intrepid",
    "jaunty",
    "karmic",
    "lucid",
    "maverick",
    "natty",
    "oneiric",
    "precise",
    "quantal",
    "raring",
    "saucy",
    "trusty",
    "utopic",
    "vivid",
    "wily",
    "xenial",
    "yakkety",
    "zesty",
    "artful",
    "bionic",
    "cosmic",
    "disco",
    "eoan",
    "focal",
    "groovy",
    "hirsute",
    "impish",
    "jammy",
    "kinetic",
    "lunar",
    "mantic",
    "noble",
    "devel",
    "upstream",
    "snap",
];

/// Is `s` a recognized Ubuntu codename (including the `devel`/`upstream`/
/// `snap` pseudo-codenames)?
pub fn is_known_codename(s: &str) -> bool {
    KNOWN_CODENAMES.contains(&s)
}

/// Is `s` a recognized special-support qualifier?
pub fn is_special_support(s: &str) -> bool {
    SPECIAL_SUPPORTS.contains(&s)
}

/// A Debian/Ubuntu release identifier, optionally qualified with a
/// special-support track (ESM, FIPS, ...).
///
/// `special_support` is empty for a plain release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UbuntuVersion {
    pub codename: String,
    #[serde(default)]
    pub special_support: SpecialSupport,
}

impl UbuntuVersion {
    pub fn new(codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
            special_support: SpecialSupport::default(),
        }
    }

    pub fn with_support(codename: impl Into<String>, support: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
            special_support: SpecialSupport(support.into()),
        }
    }
}

/// A special-support qualifier. Empty string means "no qualifier" (a plain
/// release). Wrapped in a newtype rather than `Option<String>` so empty and
/// absent serialize identically, matching the corpus's own textual
/// convention where an unqualified release is simply written without a
/// `/support` suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecialSupport(pub String);

impl SpecialSupport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SpecialSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

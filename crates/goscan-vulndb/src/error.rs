use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("meta key {0:?} is not in the recognized closed set")]
    UnrecognizedMetaKey(String),

    #[error("version token {0:?} split into more than two slash-parts")]
    TooManySlashParts(String),

    #[error("version token {0:?} has two parts but neither is a known codename")]
    NoKnownCodenameInToken(String),

    #[error("version token {0:?} has two parts but the second is not a known special-support qualifier")]
    UnknownSpecialSupport(String),

    #[error("patches block {0:?} did not begin with a Patches_<source>: header")]
    MalformedPatchesBlock(String),

    #[error("sqlite store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CorpusError>;

use std::path::PathBuf;

/// Core error type.
///
/// Adapter crates map their infrastructure failures into this type. Failures
/// of individual platform calls use [`RemoteCallError`] instead, since those
/// are downgraded to reply text rather than propagated.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A failed call against the chat platform, carrying the platform's error detail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RemoteCallError(pub String);

impl RemoteCallError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteCallError>;

use thiserror::Error;

/// Everything the catalog core can fail with
///
/// Validation and image-policy failures happen before any store call and are
/// correction prompts for the user. Store failures are retryable transport
/// problems; nothing here auto-retries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field is missing or malformed; no store call was made
    #[error("validation failed: {0}")]
    Validation(String),

    /// The image set breaks the attachment policy (count, size, encoding)
    #[error("image policy: {0}")]
    ImagePolicy(String),

    /// The target record vanished between read and write
    #[error("not found: {0}")]
    NotFound(String),

    /// The acting user does not own the record they tried to change
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// Transport or remote-store failure; safe to retry
    #[error("store error: {0}")]
    Store(String),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CatalogError::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        CatalogError::Store(msg.into())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Store(format!("bad record payload: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

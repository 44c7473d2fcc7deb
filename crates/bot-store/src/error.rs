//! Bot store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Alias `{0}` already exists")]
    AliasExists(String),

    #[error("Alias `{0}` not found")]
    AliasNotFound(String),
}

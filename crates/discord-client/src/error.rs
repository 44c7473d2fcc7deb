//! Discord client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: token rejected")]
    Unauthorized,

    #[error("Session is not open")]
    NotOpen,
}

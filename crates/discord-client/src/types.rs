//! Discord REST API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Discord user as returned by the REST API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl User {
    /// Name shown in logs: global display name if set, else username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.id)
    }
}

/// A channel message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Partial guild, as listed by `GET /users/@me/guilds`.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialGuild {
    pub id: String,
}

/// Outgoing message request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage {
    pub content: String,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

//! Discord REST API client for user-token sessions.

mod client;
mod error;
mod receiver;
mod types;

pub use client::{DiscordClient, DEFAULT_API_URL};
pub use error::DiscordError;
pub use receiver::{snowflake_cmp, MessageReceiver, SharedClient};
pub use types::*;

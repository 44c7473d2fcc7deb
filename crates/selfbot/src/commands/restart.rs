//! Restart command - drops the session and opens a fresh one.

use crate::commands::CommandHandler;
use crate::error::AppResult;
use crate::state::AppState;
use async_trait::async_trait;
use discord_client::Message;
use tracing::{error, info, warn};

pub struct RestartHandler;

impl RestartHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RestartHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for RestartHandler {
    fn names(&self) -> &'static [&'static str] {
        &["restart"]
    }

    async fn execute(&self, state: &AppState, message: &Message, _args: &[String]) -> AppResult<()> {
        let client = state.session().await;

        // The reconnect still happens if the acknowledgement is lost
        if let Err(e) = client.reply(message, "Reconnecting...").await {
            warn!("Failed to acknowledge restart: {}", e);
        }
        client.close();

        let slot = state.shared_session();
        let fresh = client.fresh_session();

        state
            .tasks()
            .schedule_after("reconnect", state.timings().restart_delay, async move {
                let opened = fresh.open().await;
                match opened {
                    Ok(_) => {
                        *slot.write().await = fresh;
                        info!("Reconnected");
                    }
                    // No retry: the bot stays offline until the process restarts
                    Err(e) => error!("Reconnect failed, session stays closed: {}", e),
                }
            })
            .await;

        Ok(())
    }
}

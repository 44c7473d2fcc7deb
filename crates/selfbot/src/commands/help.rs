//! Help command - self-erasing command menu.

use crate::commands::CommandHandler;
use crate::error::AppResult;
use crate::state::AppState;
use async_trait::async_trait;
use discord_client::Message;
use tracing::warn;

pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn names(&self) -> &'static [&'static str] {
        &["help"]
    }

    async fn execute(&self, state: &AppState, message: &Message, _args: &[String]) -> AppResult<()> {
        let client = state.session().await;
        let menu = render_help(&state.prefix().await);

        let sent = client.reply(message, &menu).await?;

        let deleter = client.clone();
        state
            .tasks()
            .schedule_after("help-cleanup", state.timings().help_ttl, async move {
                if let Err(e) = deleter.delete_message(&sent.channel_id, &sent.id).await {
                    warn!("Failed to delete help menu: {}", e);
                }
            })
            .await;

        if let Err(e) = client.delete_message(&message.channel_id, &message.id).await {
            warn!("Failed to delete help invocation: {}", e);
        }

        Ok(())
    }
}

pub fn render_help(p: &str) -> String {
    format!(
        "```
SELFBOT - HELP
==============

CONFIGURE
  {p}info      - Bot information
  {p}prefix    - Change prefix
  {p}restart   - Reconnect bot
  {p}alias     - Command aliases
  {p}help      - This menu
```"
    )
}

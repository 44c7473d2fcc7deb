//! Prefix command - shows usage or changes the command prefix.

use crate::commands::CommandHandler;
use crate::error::AppResult;
use crate::state::AppState;
use async_trait::async_trait;
use discord_client::Message;
use tracing::error;

pub struct PrefixHandler;

impl PrefixHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrefixHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for PrefixHandler {
    fn names(&self) -> &'static [&'static str] {
        &["prefix"]
    }

    async fn execute(&self, state: &AppState, message: &Message, args: &[String]) -> AppResult<()> {
        let client = state.session().await;

        let Some(new_prefix) = args.first() else {
            let p = state.prefix().await;
            client.reply(message, &usage(&p)).await?;
            return Ok(());
        };

        let reply = match state.set_prefix(new_prefix).await {
            Ok(()) => format!("Prefix changed to `{}`", new_prefix),
            Err(e) => {
                error!("Failed to save config: {}", e);
                format!("Prefix changed to `{}` (not saved: {})", new_prefix, e)
            }
        };

        client.reply(message, &reply).await?;
        Ok(())
    }
}

fn usage(p: &str) -> String {
    format!(
        "```
SELFBOT - PREFIX
================

Usage: {p}prefix <new_prefix>
Example: {p}prefix !
```"
    )
}

//! Alias command - list, add and remove command aliases.

use crate::commands::CommandHandler;
use crate::error::AppResult;
use crate::state::AppState;
use async_trait::async_trait;
use bot_store::StoreError;
use discord_client::Message;
use tracing::{debug, error};

pub struct AliasHandler;

impl AliasHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AliasHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for AliasHandler {
    fn names(&self) -> &'static [&'static str] {
        &["alias"]
    }

    async fn execute(&self, state: &AppState, message: &Message, args: &[String]) -> AppResult<()> {
        let action = args.first().map(String::as_str).unwrap_or("");

        let reply = match action {
            "" | "list" => {
                let p = state.prefix().await;
                render_list(&p, &state.store().aliases().await)
            }
            "add" => match (args.get(1), args.get(2)) {
                (Some(command), Some(alias)) => match state.store().add_alias(command, alias).await {
                    Ok(()) => format!("Created alias: {} → {}", alias.to_lowercase(), command),
                    Err(StoreError::AliasExists(alias)) => {
                        format!("Alias `{}` already exists.", alias)
                    }
                    Err(e) => {
                        error!("Failed to save alias: {}", e);
                        format!("Alias not created (save failed: {})", e)
                    }
                },
                _ => "Usage: alias add <command> <alias>".to_string(),
            },
            "remove" => match args.get(1) {
                Some(alias) => match state.store().remove_alias(alias).await {
                    Ok(_) => format!("Removed alias `{}`", alias.to_lowercase()),
                    Err(StoreError::AliasNotFound(alias)) => format!("Alias `{}` not found.", alias),
                    Err(e) => {
                        error!("Failed to save alias removal: {}", e);
                        format!("Alias not removed (save failed: {})", e)
                    }
                },
                None => "Usage: alias remove <alias>".to_string(),
            },
            other => {
                debug!("Ignoring unknown alias action {:?}", other);
                return Ok(());
            }
        };

        state.session().await.reply(message, &reply).await?;
        Ok(())
    }
}

/// Menu with usage lines and the current aliases.
pub fn render_list(p: &str, aliases: &[(String, String)]) -> String {
    let list = if aliases.is_empty() {
        "None".to_string()
    } else {
        aliases
            .iter()
            .map(|(alias, command)| format!("{} → {}", alias, command))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "```
SELFBOT - ALIAS
===============

{p}alias add <command> <alias>
{p}alias remove <alias>
{p}alias list

Current aliases:
{list}
```"
    )
}

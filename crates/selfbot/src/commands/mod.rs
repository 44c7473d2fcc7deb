//! Bot command handlers.

mod alias;
mod help;
mod info;
mod prefix;
mod restart;

pub use alias::AliasHandler;
pub use help::HelpHandler;
pub use info::InfoHandler;
pub use prefix::PrefixHandler;
pub use restart::RestartHandler;

use crate::error::AppResult;
use crate::state::AppState;
use async_trait::async_trait;
use discord_client::Message;

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Names the command is registered under (e.g. `["info", "i"]`).
    fn names(&self) -> &'static [&'static str];

    /// Execute the command. `args` excludes the command token itself.
    async fn execute(&self, state: &AppState, message: &Message, args: &[String]) -> AppResult<()>;
}

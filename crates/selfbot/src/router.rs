//! Prefix/alias command routing.

use crate::commands::{
    AliasHandler, CommandHandler, HelpHandler, InfoHandler, PrefixHandler, RestartHandler,
};
use crate::state::AppState;
use discord_client::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// A resolved command call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

/// Split `content` into a lower-cased command token and its arguments.
///
/// Returns `None` unless `content` starts with `prefix` (exact,
/// case-sensitive) and has at least one token after it.
pub fn tokenize(content: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some((name, tokens.map(String::from).collect()))
}

/// Command name to handler, fixed after startup.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in command.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(InfoHandler::new()));
        registry.register(Arc::new(RestartHandler::new()));
        registry.register(Arc::new(PrefixHandler::new()));
        registry.register(Arc::new(AliasHandler::new()));
        registry.register(Arc::new(HelpHandler::new()));
        registry
    }

    /// Register `handler` under each of its names.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        for name in handler.names() {
            self.handlers.insert((*name).to_string(), handler.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Routes incoming messages to registered handlers.
pub struct Router {
    registry: CommandRegistry,
}

impl Router {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Turn a message into an invocation, without checking the registry.
    pub async fn resolve(&self, state: &AppState, message: &Message) -> Option<Invocation> {
        let session = state.session().await;
        if let Some(me) = session.current_user() {
            if message.author.id == me.id {
                return None;
            }
        }

        let prefix = state.prefix().await;
        let (name, args) = tokenize(&message.content, &prefix)?;

        let command = match state.store().resolve_alias(&name).await {
            Some(target) => {
                debug!("Alias {} -> {}", name, target);
                target
            }
            None => name,
        };

        Some(Invocation { command, args })
    }

    /// Route one message. Returns whether a handler ran.
    ///
    /// Handler errors are logged here and never reach the channel.
    pub async fn dispatch(&self, state: &AppState, message: &Message) -> bool {
        let Some(invocation) = self.resolve(state, message).await else {
            return false;
        };

        let Some(handler) = self.registry.get(&invocation.command) else {
            debug!("No handler for {:?}", invocation.command);
            return false;
        };

        debug!(
            "Dispatching {} {:?} from {}",
            invocation.command, invocation.args, message.author.id
        );
        if let Err(e) = handler.execute(state, message, &invocation.args).await {
            error!("Command {} failed: {}", invocation.command, e);
        }
        true
    }
}

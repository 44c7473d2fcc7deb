//! Application state shared by the router and every handler.

use crate::config::BotConfig;
use crate::error::AppResult;
use crate::tasks::TaskScheduler;
use bot_store::JsonStore;
use discord_client::{DiscordClient, SharedClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

/// Delays used by handlers that schedule follow-up work.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub restart_delay: Duration,
    pub help_ttl: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_secs(3),
            help_ttl: Duration::from_secs(120),
        }
    }
}

/// Everything a command can read or mutate, built once in `main`.
pub struct AppState {
    config: RwLock<BotConfig>,
    config_path: PathBuf,
    store: JsonStore,
    session: SharedClient,
    tasks: TaskScheduler,
    timings: Timings,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        config: BotConfig,
        config_path: impl Into<PathBuf>,
        store: JsonStore,
        client: DiscordClient,
        timings: Timings,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            config_path: config_path.into(),
            store,
            session: Arc::new(RwLock::new(client)),
            tasks: TaskScheduler::new(),
            timings,
            started_at: Instant::now(),
        }
    }

    /// Current command prefix.
    pub async fn prefix(&self) -> String {
        self.config.read().await.prefix.clone()
    }

    /// Change the prefix and rewrite the config file.
    ///
    /// The new prefix is live even if writing the file fails.
    pub async fn set_prefix(&self, prefix: &str) -> AppResult<()> {
        let mut config = self.config.write().await;
        config.prefix = prefix.to_string();
        info!("Prefix changed to {:?}", prefix);
        config.save(&self.config_path).await?;
        Ok(())
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// The live session.
    pub async fn session(&self) -> DiscordClient {
        self.session.read().await.clone()
    }

    /// Handle to the live session slot, for tasks that replace it later.
    pub fn shared_session(&self) -> SharedClient {
        self.session.clone()
    }

    pub fn tasks(&self) -> &TaskScheduler {
        &self.tasks
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Wall-clock time since the state was built.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

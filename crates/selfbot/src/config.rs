//! Runtime settings (environment) and the bot config file (token, prefix).

use anyhow::{bail, Context, Result};
use bot_store::{write_json_atomic, StoreError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix used when neither the config file nor the environment sets one.
pub const DEFAULT_PREFIX: &str = "!";

/// Environment variable overriding the config file token.
pub const TOKEN_ENV: &str = "USER_TOKEN";

/// Environment variable overriding the config file prefix.
pub const PREFIX_ENV: &str = "PREFIX";

/// Process settings loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Discord API configuration
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Bot behaviour
    #[serde(default)]
    pub bot: BotSettings,

    /// Liveness endpoint
    #[serde(default)]
    pub health: HealthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// JSON file holding token and prefix
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,

    /// JSON file holding aliases, lists and data
    #[serde(default = "default_storage_file")]
    pub storage_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Comma-separated channel IDs to watch for commands
    #[serde(default)]
    pub channels: String,

    /// Poll interval for new messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotSettings {
    /// Delay between closing and reopening the session on `restart`
    #[serde(default = "default_restart_delay", with = "humantime_serde")]
    pub restart_delay: Duration,

    /// How long the `help` menu stays up before it is deleted
    #[serde(default = "default_help_ttl", with = "humantime_serde")]
    pub help_ttl: Duration,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl DiscordConfig {
    /// Watched channel IDs, blanks dropped.
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

impl HealthConfig {
    /// Address the health listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid HEALTH__LISTEN_ADDR {:?}", self.listen_addr))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// Default implementations
impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            storage_file: default_storage_file(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            channels: String::new(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            restart_delay: default_restart_delay(),
            help_ttl: default_help_ttl(),
            log_level: default_log_level(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

// Default value functions
fn default_config_file() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_storage_file() -> PathBuf {
    PathBuf::from("storage.json")
}

fn default_api_url() -> String {
    discord_client::DEFAULT_API_URL.into()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_restart_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_help_ttl() -> Duration {
    Duration::from_secs(120)
}

fn default_log_level() -> String {
    "info".into()
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

impl Settings {
    /// Load settings from environment variables (`BOT__LOG_LEVEL`, ...).
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Channel IDs must stay strings
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Token and prefix the bot runs with.
///
/// The token stays wrapped in a `SecretString`, so `Debug` output and log
/// lines never carry it.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: SecretString,
    pub prefix: String,
}

/// On-disk shape of [`BotConfig`].
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    token: String,
    #[serde(default)]
    prefix: String,
}

#[derive(Serialize)]
struct ConfigFileRef<'a> {
    token: &'a str,
    prefix: &'a str,
}

impl BotConfig {
    pub fn new(token: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            prefix: prefix.into(),
        }
    }

    /// Read and parse the config file. Both failures are fatal at startup.
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;

        let file: ConfigFile =
            serde_json::from_slice(&data).with_context(|| format!("Invalid {}", path.display()))?;
        Ok(Self::new(file.token, file.prefix))
    }

    /// Apply `USER_TOKEN` / `PREFIX` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::var(TOKEN_ENV).ok(), std::env::var(PREFIX_ENV).ok());
    }

    /// Replace token and prefix with the given values when they are non-empty.
    pub fn apply_overrides(&mut self, token: Option<String>, prefix: Option<String>) {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = SecretString::new(token);
        }
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            self.prefix = prefix;
        }
    }

    /// Fill the default prefix and require a token.
    pub fn finalize(&mut self) -> Result<()> {
        if self.token.expose_secret().is_empty() {
            bail!("No token found! Set {} or put it in the config file", TOKEN_ENV);
        }
        if self.prefix.is_empty() {
            self.prefix = DEFAULT_PREFIX.to_string();
        }
        Ok(())
    }

    /// Overwrite the config file with this config.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = ConfigFileRef {
            token: self.token.expose_secret(),
            prefix: &self.prefix,
        };
        write_json_atomic(path, &file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(token: &str, prefix: &str) -> BotConfig {
        BotConfig::new(token, prefix)
    }

    #[test]
    fn test_overrides_only_apply_when_non_empty() {
        let mut cfg = config("file-token", "$");

        cfg.apply_overrides(Some(String::new()), None);
        assert_eq!(cfg.token.expose_secret(), "file-token");
        assert_eq!(cfg.prefix, "$");

        cfg.apply_overrides(Some("env-token".into()), Some("?".into()));
        assert_eq!(cfg.token.expose_secret(), "env-token");
        assert_eq!(cfg.prefix, "?");
    }

    #[test]
    fn test_finalize_defaults_prefix() {
        let mut cfg = config("t", "");
        cfg.finalize().unwrap();
        assert_eq!(cfg.prefix, DEFAULT_PREFIX);
    }

    #[test]
    fn test_finalize_requires_token() {
        let mut cfg = config("", "!");
        let err = cfg.finalize().unwrap_err();
        assert!(err.to_string().contains(TOKEN_ENV));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cfg = config("abcdefghijklmnop", "!");
        let debug = format!("{:?}", cfg);
        assert!(!debug.contains("abcdefghijklmnop"));
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains("prefix: \"!\""));
    }

    #[test]
    fn test_health_socket_addr() {
        let health = HealthConfig::default();
        assert_eq!(health.socket_addr().unwrap(), "0.0.0.0:8080".parse::<std::net::SocketAddr>().unwrap());

        let bad = HealthConfig {
            listen_addr: "localhost".into(),
            port: 8080,
        };
        let err = bad.socket_addr().unwrap_err();
        assert!(err.to_string().contains("HEALTH__LISTEN_ADDR"));
    }

    #[test]
    fn test_channel_ids() {
        let discord = DiscordConfig {
            channels: " 1, 2,,3 ".into(),
            ..DiscordConfig::default()
        };
        assert_eq!(discord.channel_ids(), vec!["1", "2", "3"]);
        assert!(DiscordConfig::default().channel_ids().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = BotConfig::load(&dir.path().join("config.json")).await.unwrap_err();
        assert!(err.to_string().starts_with("Cannot read"));
    }

    #[tokio::test]
    async fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ token: ").unwrap();

        let err = BotConfig::load(&path).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let cfg = config("tok", ">>");

        cfg.save(&path).await.unwrap();
        let loaded = BotConfig::load(&path).await.unwrap();
        assert_eq!(loaded.token.expose_secret(), "tok");
        assert_eq!(loaded.prefix, ">>");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"token\": \"tok\""));
        assert!(raw.contains("\n  \"prefix\": \">>\""));
    }
}

//! Info command - uptime, latency and account counters.

use crate::commands::CommandHandler;
use crate::error::AppResult;
use crate::state::AppState;
use async_trait::async_trait;
use discord_client::Message;
use std::time::Duration;
use tracing::warn;

pub struct InfoHandler;

impl InfoHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InfoHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Values shown by the info card.
#[derive(Debug, Clone)]
pub struct InfoSnapshot {
    pub uptime: Duration,
    pub latency: Duration,
    pub prefix: String,
    pub servers: usize,
    pub friends: usize,
    pub blacklisted: usize,
}

#[async_trait]
impl CommandHandler for InfoHandler {
    fn names(&self) -> &'static [&'static str] {
        &["info", "i"]
    }

    async fn execute(&self, state: &AppState, message: &Message, _args: &[String]) -> AppResult<()> {
        let client = state.session().await;

        let latency = match client.ping().await {
            Ok(latency) => latency,
            Err(e) => {
                warn!("Latency probe failed: {}", e);
                client.latency().unwrap_or_default()
            }
        };

        let servers = match client.guilds().await {
            Ok(guilds) => guilds.len(),
            Err(e) => {
                warn!("Failed to list guilds: {}", e);
                0
            }
        };

        let snapshot = InfoSnapshot {
            uptime: state.uptime(),
            latency,
            prefix: state.prefix().await,
            servers,
            friends: state.store().friends_count().await,
            blacklisted: state.store().blacklist_count().await,
        };

        client.reply(message, &render_info(&snapshot)).await?;
        Ok(())
    }
}

/// Format a duration as whole `<h>h <m>m <s>s`.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Round a duration to the nearest millisecond.
pub fn round_millis(latency: Duration) -> u128 {
    (latency.as_micros() + 500) / 1000
}

pub fn render_info(info: &InfoSnapshot) -> String {
    format!(
        "```
SELFBOT - INFO
==============

Uptime       : {}
Ping         : {}ms
Prefix       : {}
Servers      : {}
Friends      : {}
Blacklisted  : {}
Version      : {}
```",
        format_uptime(info.uptime),
        round_millis(info.latency),
        info.prefix,
        info.servers,
        info.friends,
        info.blacklisted,
        env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "0h 0m 59s");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 7 * 60 + 9)), "3h 7m 9s");
        assert_eq!(format_uptime(Duration::from_secs(50 * 3600)), "50h 0m 0s");
    }

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(Duration::from_micros(41_499)), 41);
        assert_eq!(round_millis(Duration::from_micros(41_500)), 42);
        assert_eq!(round_millis(Duration::ZERO), 0);
    }

    #[test]
    fn test_render_info() {
        let text = render_info(&InfoSnapshot {
            uptime: Duration::from_secs(3661),
            latency: Duration::from_millis(87),
            prefix: "$".into(),
            servers: 4,
            friends: 2,
            blacklisted: 1,
        });

        assert!(text.contains("Uptime       : 1h 1m 1s"));
        assert!(text.contains("Ping         : 87ms"));
        assert!(text.contains("Prefix       : $"));
        assert!(text.contains("Servers      : 4"));
        assert!(text.contains("Friends      : 2"));
        assert!(text.contains("Blacklisted  : 1"));
    }
}

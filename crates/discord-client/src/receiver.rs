//! Message receiver that polls watched channels.

use crate::client::DiscordClient;
use crate::types::Message;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Live session handle. Replacing the inner client swaps the session
/// every holder sees on its next read.
pub type SharedClient = Arc<RwLock<DiscordClient>>;

const PAGE_SIZE: u8 = 50;

/// Polls a fixed set of channels for new messages.
pub struct MessageReceiver {
    session: SharedClient,
    channels: Vec<String>,
    poll_interval: Duration,
}

impl MessageReceiver {
    /// Create a new message receiver.
    pub fn new(session: SharedClient, channels: Vec<String>, poll_interval: Duration) -> Self {
        Self {
            session,
            channels,
            poll_interval,
        }
    }

    /// Start receiving messages as an async stream, oldest first per channel.
    ///
    /// The first poll of each channel only records its newest message, so
    /// history that predates startup is never delivered. While the session
    /// is closed nothing is polled.
    pub fn stream(self) -> impl Stream<Item = Message> {
        async_stream::stream! {
            let mut cursors: HashMap<String, String> = HashMap::new();

            loop {
                let client = self.session.read().await.clone();
                if !client.is_open() {
                    sleep(self.poll_interval).await;
                    continue;
                }

                for channel in &self.channels {
                    let after = cursors.get(channel).cloned();
                    let limit = if after.is_some() { PAGE_SIZE } else { 1 };

                    let mut messages = match client.channel_messages(channel, after.as_deref(), limit).await {
                        Ok(messages) => messages,
                        Err(e) => {
                            error!("Receive error on {}: {}", channel, e);
                            // Back off on error
                            sleep(Duration::from_secs(5)).await;
                            continue;
                        }
                    };
                    messages.sort_by(|a, b| snowflake_cmp(&a.id, &b.id));

                    let newest = messages
                        .last()
                        .map(|m| m.id.clone())
                        .or(after.clone())
                        .unwrap_or_else(|| "0".to_string());
                    cursors.insert(channel.clone(), newest);

                    if after.is_none() {
                        debug!("Primed channel {}", channel);
                        continue;
                    }

                    for msg in messages {
                        debug!("Received: {} from {}",
                            msg.content.chars().take(50).collect::<String>(),
                            msg.author.id
                        );
                        yield msg;
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}

/// Order snowflake IDs numerically without parsing.
pub fn snowflake_cmp(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

//! Discord REST client authenticated with a user token.

use crate::error::DiscordError;
use crate::types::*;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Public REST endpoint.
pub const DEFAULT_API_URL: &str = "https://discord.com/api/v9";

/// Largest page `GET /channels/{id}/messages` returns.
const MAX_PAGE: u8 = 100;

#[derive(Default)]
struct SessionState {
    open: AtomicBool,
    current_user: RwLock<Option<User>>,
    latency: RwLock<Option<Duration>>,
}

/// Discord REST API client.
///
/// Cloning is cheap; clones share the same session state, so closing one
/// clone closes them all. The token is held as a `SecretString` and only
/// exposed when a request is signed.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    base_url: String,
    token: SecretString,
    session: Arc<SessionState>,
}

impl DiscordClient {
    /// Create a new client. No request is made until [`open`](Self::open).
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            session: Arc::default(),
        })
    }

    /// Client for the same endpoint and token with a new, closed session.
    ///
    /// Closing or reopening the result does not affect `self`.
    pub fn fresh_session(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            session: Arc::default(),
        }
    }

    /// Open the session: validate the token and cache the current user.
    #[instrument(skip(self))]
    pub async fn open(&self) -> Result<User, DiscordError> {
        let user = self.fetch_current_user().await?;
        *self
            .session
            .current_user
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(user.clone());
        self.session.open.store(true, Ordering::SeqCst);
        info!("Session opened as {}", user);
        Ok(user)
    }

    /// Close the session. Pending receivers stop yielding messages.
    pub fn close(&self) {
        if self.session.open.swap(false, Ordering::SeqCst) {
            info!("Session closed");
        }
    }

    /// Whether [`open`](Self::open) succeeded and [`close`](Self::close) has not been called since.
    pub fn is_open(&self) -> bool {
        self.session.open.load(Ordering::SeqCst)
    }

    /// The account this session is authenticated as, once opened.
    pub fn current_user(&self) -> Option<User> {
        self.session
            .current_user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Last measured request round-trip time.
    pub fn latency(&self) -> Option<Duration> {
        *self.session.latency.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Measure a fresh round trip against `GET /users/@me`.
    pub async fn ping(&self) -> Result<Duration, DiscordError> {
        self.fetch_current_user().await?;
        self.latency().ok_or(DiscordError::NotOpen)
    }

    /// Get the authenticated user.
    #[instrument(skip(self))]
    pub async fn fetch_current_user(&self) -> Result<User, DiscordError> {
        let request = self.client.get(self.url("/users/@me"));
        let response = self.send_timed(request).await?;
        Ok(response.json().await?)
    }

    /// List the guilds the user is a member of.
    #[instrument(skip(self))]
    pub async fn guilds(&self) -> Result<Vec<PartialGuild>, DiscordError> {
        let request = self.client.get(self.url("/users/@me/guilds"));
        let response = self.send_timed(request).await?;
        let guilds: Vec<PartialGuild> = response.json().await?;
        debug!("Member of {} guilds", guilds.len());
        Ok(guilds)
    }

    /// Send a text message to a channel.
    #[instrument(skip(self, content))]
    pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<Message, DiscordError> {
        let request = self
            .client
            .post(self.url(&format!("/channels/{}/messages", channel_id)))
            .json(&CreateMessage {
                content: content.to_string(),
            });

        let response = match self.send_timed(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Send failed: {}", e);
                return Err(e);
            }
        };

        debug!("Sent message to {}", channel_id);
        Ok(response.json().await?)
    }

    /// Reply in the channel the original message came from.
    pub async fn reply(&self, original: &Message, content: &str) -> Result<Message, DiscordError> {
        self.send_message(&original.channel_id, content).await
    }

    /// Delete a message.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<(), DiscordError> {
        let request = self.client.delete(self.url(&format!(
            "/channels/{}/messages/{}",
            channel_id, message_id
        )));
        self.send_timed(request).await?;
        debug!("Deleted message {} in {}", message_id, channel_id);
        Ok(())
    }

    /// Fetch channel messages newer than `after`, newest first (API order).
    #[instrument(skip(self))]
    pub async fn channel_messages(
        &self,
        channel_id: &str,
        after: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>, DiscordError> {
        let limit = limit.clamp(1, MAX_PAGE).to_string();
        let mut query = vec![("limit", limit.as_str())];
        if let Some(after) = after {
            query.push(("after", after));
        }

        let request = self
            .client
            .get(self.url(&format!("/channels/{}/messages", channel_id)))
            .query(&query);
        let response = self.send_timed(request).await?;
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach auth, send, record round-trip time and map error statuses.
    async fn send_timed(&self, request: RequestBuilder) -> Result<Response, DiscordError> {
        let started = Instant::now();
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.token.expose_secret().as_str())
            .send()
            .await?;
        *self.session.latency.write().unwrap_or_else(|e| e.into_inner()) = Some(started.elapsed());

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DiscordError::Unauthorized);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

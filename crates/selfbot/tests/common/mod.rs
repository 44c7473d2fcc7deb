//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bot_store::JsonStore;
use discord_client::{DiscordClient, Message, User};
use selfbot::commands::CommandHandler;
use selfbot::config::BotConfig;
use selfbot::{AppResult, AppState, Timings};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Account the test session is logged in as.
pub const SELF_ID: &str = "1";
/// Another user sending commands.
pub const OTHER_ID: &str = "2";
pub const CHANNEL: &str = "100";
/// ID the mock server assigns to every sent message.
pub const SENT_ID: &str = "900";

pub fn user_json(id: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "username": format!("user{}", id) })
}

/// Mount the endpoints every command touches.
pub async fn mount_defaults(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "10", "name": "one"},
            {"id": "11", "name": "two"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/channels/\d+/messages$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": SENT_ID,
            "channel_id": CHANNEL,
            "author": user_json(SELF_ID),
            "content": "",
            "timestamp": "2024-01-01T00:00:00+00:00"
        })))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/channels/\d+/messages/\d+$"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Mock server that accepts the session and every command call.
pub async fn mock_discord_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(SELF_ID)))
        .mount(&server)
        .await;
    mount_defaults(&server).await;

    server
}

pub fn fast_timings() -> Timings {
    Timings {
        restart_delay: Duration::from_millis(20),
        help_ttl: Duration::from_millis(20),
    }
}

/// App state with an open session against `server`, files under `dir`.
pub async fn test_state(server: &MockServer, dir: &TempDir, timings: Timings) -> AppState {
    let config = BotConfig::new("test-token", "!");
    let config_path = dir.path().join("config.json");
    config.save(&config_path).await.unwrap();

    let store = JsonStore::open(dir.path().join("storage.json")).await.unwrap();

    let client = DiscordClient::new(server.uri(), config.token.clone()).unwrap();
    client.open().await.unwrap();

    AppState::new(config, config_path, store, client, timings)
}

pub fn incoming(id: &str, author_id: &str, content: &str) -> Message {
    Message {
        id: id.into(),
        channel_id: CHANNEL.into(),
        guild_id: None,
        author: User {
            id: author_id.into(),
            username: format!("user{}", author_id),
            global_name: None,
        },
        content: content.into(),
        timestamp: chrono::Utc::now(),
    }
}

/// Contents of every message the bot sent, in order.
pub async fn sent_messages(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "POST")
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["content"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

/// Paths of every DELETE the bot issued, in order.
pub async fn deleted_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "DELETE")
        .map(|r| r.url.path().to_string())
        .collect()
}

/// Handler that records the arguments of every call.
pub struct RecordingHandler {
    names: &'static [&'static str],
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingHandler {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    fn names(&self) -> &'static [&'static str] {
        self.names
    }

    async fn execute(&self, _state: &AppState, _message: &Message, args: &[String]) -> AppResult<()> {
        self.calls.lock().unwrap().push(args.to_vec());
        Ok(())
    }
}

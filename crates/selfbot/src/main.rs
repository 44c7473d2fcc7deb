//! Self-bot - Main entry point.

use anyhow::Context;
use bot_store::JsonStore;
use discord_client::{DiscordClient, MessageReceiver};
use selfbot::config::{BotConfig, Settings};
use selfbot::{health, AppState, CommandRegistry, Router, Timings};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&settings.bot.log_level);

    if let Err(e) = run(settings).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    info!("Starting selfbot v{}", env!("CARGO_PKG_VERSION"));

    let mut config = BotConfig::load(&settings.paths.config_file).await?;
    config.apply_env_overrides();
    config.finalize()?;

    let store = JsonStore::open(settings.paths.storage_file.clone())
        .await
        .context("Failed to load storage")?;

    let client = DiscordClient::new(&settings.discord.api_url, config.token.clone())
        .context("Failed to create session")?;
    let user = client.open().await.context("Failed to connect")?;
    info!("Selfbot running | Prefix: {} | User: {}", config.prefix, user);

    let timings = Timings {
        restart_delay: settings.bot.restart_delay,
        help_ttl: settings.bot.help_ttl,
    };
    let state = AppState::new(config, &settings.paths.config_file, store, client, timings);

    let router = Router::new(CommandRegistry::with_defaults());
    info!("Registered {} command names", router.registry().len());

    // Health check for the hosting platform
    let addr = settings.health.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind health endpoint to {}", addr))?;
    info!("Health endpoint listening on {}", addr);

    let (health_stop, health_stopped) = oneshot::channel::<()>();
    let health_task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = health_stopped.await;
        };
        if let Err(e) = health::serve(listener, shutdown).await {
            error!("Health endpoint error: {}", e);
        }
    });

    let channels = settings.discord.channel_ids();
    if channels.is_empty() {
        warn!("DISCORD__CHANNELS is empty; no messages will be received");
    }
    info!("Watching {} channels", channels.len());

    let receiver = MessageReceiver::new(
        state.shared_session(),
        channels,
        settings.discord.poll_interval,
    );
    let mut stream = Box::pin(receiver.stream());

    // Main message loop
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            Some(message) = stream.next() => {
                router.dispatch(&state, &message).await;
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    state.tasks().shutdown().await;
    if let Err(e) = state.store().save().await {
        error!("Failed to save storage: {}", e);
    }
    state.session().await.close();

    let _ = health_stop.send(());
    if let Err(e) = health_task.await {
        warn!("Health task ended abnormally: {}", e);
    }

    info!("Selfbot stopped safely.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

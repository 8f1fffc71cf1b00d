//! Huddle CLI
//!
//! Headless client for the Huddle realtime service: join rooms by code and
//! stream a room's realtime session to the log.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use huddle::config::{generate_default_config, Config, LoggingConfig};
use huddle::push::{PushReceiver, TracingSink};
use huddle::rooms::{JoinOutcome, RoomClient};
use huddle::session::{SessionEvent, SessionManager, WsConnector};

#[derive(Parser)]
#[command(name = "huddle", version, about = "Huddle client core")]
struct Cli {
    /// Path to a config file (defaults to the standard locations)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a default config file to stdout
    Config,

    /// Join a room by invite code
    Join {
        /// Human-entered room code (normalized before submission)
        code: String,

        /// Bearer credential
        #[arg(long, env = "HUDDLE_TOKEN")]
        token: String,
    },

    /// Open a realtime session for a room and stream its events
    Run {
        /// Room identifier
        room_id: u32,

        /// Bearer credential
        #[arg(long, env = "HUDDLE_TOKEN")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::Config) {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    tracing::info!("Huddle client v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Config => unreachable!(),
        Command::Join { code, token } => join(&config, &token, &code).await,
        Command::Run { room_id, token } => run(&config, room_id, &token).await,
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("huddle={}", logging.level)),
    );

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn join(config: &Config, token: &str, code: &str) -> anyhow::Result<()> {
    let client = RoomClient::new(
        config.api.base_url.clone(),
        config.api.request_timeout_secs,
    );

    match client.join_by_code(token, code).await? {
        JoinOutcome::Joined(room) => {
            println!("Joined room {} ({})", room.name, room.room_id);
            Ok(())
        }
        JoinOutcome::EmptyCode => {
            println!("No code entered");
            Ok(())
        }
    }
}

async fn run(config: &Config, room_id: u32, token: &str) -> anyhow::Result<()> {
    let connector = Arc::new(WsConnector::new(config.realtime.base_url.clone()));
    let (mut manager, mut events) = SessionManager::new(
        connector,
        Duration::from_millis(config.realtime.reconnect_delay_ms),
    );

    // Push receiver runs in its own background context. The sender half is
    // where the platform glue would deliver payloads; the headless CLI only
    // keeps it alive.
    let (_push_tx, push_rx) = mpsc::channel(16);
    let push = PushReceiver::spawn(config.push.clone(), push_rx, Arc::new(TracingSink));

    manager.apply(Some(room_id), Some(token)).await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
            event = events.recv() => match event {
                Some(SessionEvent::Connected { handle_id }) => {
                    tracing::info!(%handle_id, "connected");
                }
                Some(SessionEvent::Disconnected { reason }) => {
                    tracing::info!(reason = reason.as_deref().unwrap_or("-"), "disconnected");
                }
                Some(SessionEvent::ProtocolError { message }) => {
                    tracing::warn!(%message, "protocol error");
                }
                Some(SessionEvent::Frame(frame)) => {
                    tracing::info!(?frame, "frame");
                }
                None => break,
            }
        }
    }

    manager.shutdown().await;
    push.shutdown();

    tracing::info!("Huddle shutdown complete");
    Ok(())
}

//! Headless player (mixtape-player) - Main entry point
//!
//! Loads a queue from a JSON file and drives the queue controller and listening-session
//! accumulator from line commands on stdin. Session records go to a JSON-lines file when
//! configured, otherwise to the log.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mixtape_common::events::EventBus;
use mixtape_player::command::PlayerCommand;
use mixtape_player::config::PlayerConfig;
use mixtape_player::playback::{PlaybackContext, QueueController, QueueItem};
use mixtape_player::session::{AnalyticsSink, JsonLinesSink, LogSink, SessionAccumulator};
use mixtape_player::Player;

/// Command-line arguments for mixtape-player
#[derive(Parser, Debug)]
#[command(name = "mixtape-player")]
#[command(about = "Headless playback queue and listening-session recorder")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "MIXTAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Queue file: JSON array of queue items
    #[arg(short, long)]
    queue: Option<PathBuf>,

    /// Index of the first item to play
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Provenance tag for the queue (library, top_songs, ...)
    #[arg(long, default_value = "library")]
    context: PlaybackContext,

    /// Override the configured user id
    #[arg(short, long)]
    user_id: Option<i64>,

    /// Override the configured session records file
    #[arg(short, long)]
    records: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config).context("Failed to initialize logging")?;

    match source.path() {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file, using built-in defaults"),
    }

    let user_id = args.user_id.unwrap_or(config.user_id);
    let records_path = args.records.clone().or_else(|| config.records_path.clone());
    let sink: Arc<dyn AnalyticsSink> = match &records_path {
        Some(path) => {
            info!("Recording sessions to {}", path.display());
            Arc::new(JsonLinesSink::new(path.clone()))
        }
        None => Arc::new(LogSink),
    };

    let event_bus = EventBus::new(config.event_bus_capacity);
    spawn_event_logger(&event_bus);

    let controller = QueueController::with_event_bus(event_bus.clone());
    let accumulator = SessionAccumulator::new(sink).with_event_bus(event_bus.clone());
    let mut player = Player::new(controller, accumulator, user_id);

    if let Some(queue_path) = &args.queue {
        let items = load_queue(queue_path)?;
        info!("Loaded {} queue items from {}", items.len(), queue_path.display());
        player.play_queue(items, args.start, args.context);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Ready for commands (next, prev, toggle, seek <ms>, progress <ms>, complete, stop, status, quit)");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<PlayerCommand>() {
                    Ok(PlayerCommand::Quit) => break,
                    Ok(PlayerCommand::Status) => print_status(&player)?,
                    Ok(command) => command.apply(&mut player),
                    Err(e) => warn!("{}", e),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    info!("Shutting down, flushing pending session records");
    player.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &PlayerConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("mixtape_player={0},mixtape_common={0}", config.logging.level).into());

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn load_queue(path: &Path) -> Result<Vec<QueueItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read queue file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse queue file {}", path.display()))
}

fn print_status(player: &Player) -> Result<()> {
    let snapshot = player.snapshot();
    let status = serde_json::json!({
        "current": snapshot.current_item.as_ref().map(|item| item.navigation_id()),
        "title": snapshot.current_item.as_ref().map(|item| item.title().to_string()),
        "index": snapshot.current_index,
        "queue_len": snapshot.queue.len(),
        "is_playing": snapshot.is_playing,
        "position_ms": snapshot.clamped_position_ms(),
        "duration_ms": snapshot.duration_ms,
        "progress": snapshot.progress(),
        "context": snapshot.context,
        "session": player.accumulator().phase().to_string(),
        "listened_ms": player.accumulator().listened_ms(),
    });
    println!("{}", serde_json::to_string(&status)?);
    Ok(())
}

/// Log every bus event at debug level
fn spawn_event_logger(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(event = event.event_type(), ?event, "Player event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event logger lagged behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! CLI for topicsync
//!
//! Subcommands:
//! - `subscribe <topic>` / `unsubscribe <topic>`: queue a change, or send it
//!   right away with `--now`
//! - `pending`: list queued operations
//! - `sync`: replay queued operations using the current token

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Map;
use tracing::{error, info};

use topicsync::backend::{BackendClient, StaticCredential, WebSocketBackend};
use topicsync::config::{Settings, load_config};
use topicsync::persistence::SledStore;
use topicsync::queue::TopicAction;
use topicsync::utils::logging;
use topicsync::{Error, PubSubCoordinator, Result};

#[derive(Parser)]
#[command(name = "topicsync", about = "Manage push topic subscriptions")]
struct Cli {
    /// Registration token; without one, changes stay queued
    #[arg(long, env = "TOPICSYNC_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Subscribe to a topic
    Subscribe {
        topic: String,
        /// Call the backend directly instead of queueing
        #[arg(long)]
        now: bool,
    },
    /// Unsubscribe from a topic
    Unsubscribe {
        topic: String,
        /// Call the backend directly instead of queueing
        #[arg(long)]
        now: bool,
    },
    /// List queued operations
    Pending,
    /// Replay queued operations
    Sync,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&settings.logging.level);

    if let Err(e) = run(cli, settings).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let store = Arc::new(SledStore::open(&settings.storage.path)?);
    let backend: Arc<dyn BackendClient> = Arc::new(WebSocketBackend::from_settings(&settings.backend));
    let credential = Arc::new(StaticCredential::new(cli.token.clone()));
    let coordinator = PubSubCoordinator::new(Some(backend), credential, store)?;
    let token = cli.token.filter(|t| !t.is_empty());

    match cli.command {
        Command::Subscribe { topic, now } => {
            change(&coordinator, token, &topic, TopicAction::Subscribe, now).await
        }
        Command::Unsubscribe { topic, now } => {
            change(&coordinator, token, &topic, TopicAction::Unsubscribe, now).await
        }
        Command::Pending => {
            let pending = coordinator.pending_operations();
            if pending.is_empty() {
                println!("No pending operations.");
            }
            for op in pending {
                println!("{:<12} {}", op.action.to_string(), op.topic);
            }
            Ok(())
        }
        Command::Sync => {
            if token.is_none() {
                return Err(Error::MissingCredential);
            }
            coordinator.trigger_sync(true);
            coordinator.wait_until_drained().await;
            info!("All pending operations attempted");
            Ok(())
        }
    }
}

async fn change(
    coordinator: &Arc<PubSubCoordinator>,
    token: Option<String>,
    topic: &str,
    action: TopicAction,
    now: bool,
) -> Result<()> {
    if now {
        let token = token.ok_or(Error::MissingCredential)?;
        let options = Map::new();
        match action {
            TopicAction::Subscribe => coordinator.subscribe_now(&token, topic, &options).await?,
            TopicAction::Unsubscribe => coordinator.unsubscribe_now(&token, topic, &options).await?,
        }
        info!("{action} {topic} done");
        return Ok(());
    }

    let done = match action {
        TopicAction::Subscribe => coordinator.subscribe_deferred(topic)?,
        TopicAction::Unsubscribe => coordinator.unsubscribe_deferred(topic)?,
    };

    if token.is_none() {
        info!("Queued {action} {topic}; it will be sent once a token is available");
        return Ok(());
    }

    // restored operations run first; ours resolves in order
    coordinator.trigger_sync(true);
    match done.await {
        Ok(result) => result?,
        Err(_) => return Err(Error::Backend("operation was dropped".to_string())),
    }
    info!("{action} {topic} done");
    Ok(())
}

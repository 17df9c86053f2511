//! CLI entry point for chatrelay
//!
//! Hosts the adapter registry: loads configuration, registers the Slack
//! adapter, and drains the bot-core inbound channel until ctrl-c.

use anyhow::Result;
use chatrelay_channels::{AdapterRegistry, SlackAdapter};
use chatrelay_core::config::ConfigLoader;
use chatrelay_core::logging::init_logging;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(about = "Chat-service adapter gateway for a generic bot core")]
#[command(version)]
struct Cli {
    /// Configuration directory (defaults to ~/.chatrelay)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    let _log_guard = init_logging(&config.logging);

    if !config.adapters.slack.enabled {
        anyhow::bail!("No adapter enabled; set adapters.slack.enabled in config.json");
    }

    let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
    let registry = AdapterRegistry::new(inbound_tx);
    registry.register(SlackAdapter::new()).await;

    registry.init_all(&config).await?;
    registry.start_all().await?;

    info!("chatrelay gateway running; press ctrl-c to exit");

    loop {
        tokio::select! {
            message = inbound_rx.recv() => {
                match message {
                    Some(message) => {
                        let sender = message
                            .from_user
                            .as_ref()
                            .map(|u| u.name.as_str())
                            .unwrap_or("<unknown>");
                        info!(
                            adapter = %message.source_adapter,
                            channel = %message.reply_context.channel_id,
                            "{}: {}",
                            sender,
                            message.text
                        );
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    registry.stop_all().await;
    Ok(())
}

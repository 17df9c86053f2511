//! Slack adapter
//!
//! Bridges the Slack RTM event stream and directory APIs to the bot core
//! through the canonical message model. Startup builds the directory
//! cache, opens the real-time session, and spawns the dispatch loop; the
//! outbound gateway resolves channel names against the cache and posts
//! over the session.

pub mod api;
pub mod directory;
pub mod dispatch;
pub mod events;
pub mod rtm;
pub mod translate;

use crate::base::{Adapter, AdapterError, InboundSender, Result};
use async_trait::async_trait;
use chatrelay_core::bus::Message;
use chatrelay_core::config::schema::{Config, SlackConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use api::SlackApi;
use directory::Directory;
use dispatch::{DispatchState, Dispatcher};
use rtm::RtmHandle;

/// Registered adapter name, stamped on every canonical message
pub const ADAPTER_NAME: &str = "slack";

/// Slack adapter over the RTM event stream
pub struct SlackAdapter {
    config: SlackConfig,
    default_channel: String,
    inbound_tx: Option<InboundSender>,
    directory: Option<Arc<Directory>>,
    connection: Option<RtmHandle>,
    dispatch_task: Option<JoinHandle<DispatchState>>,
    running: bool,
}

impl SlackAdapter {
    /// Create a new, unconfigured Slack adapter
    pub fn new() -> Self {
        Self {
            config: SlackConfig::default(),
            default_channel: String::new(),
            inbound_tx: None,
            directory: None,
            connection: None,
            dispatch_task: None,
            running: false,
        }
    }

    /// The directory cache, once built
    pub fn directory(&self) -> Option<&Directory> {
        self.directory.as_deref()
    }

    fn connection_ref(&self) -> Result<&RtmHandle> {
        self.connection
            .as_ref()
            .ok_or_else(|| AdapterError::NotRunning("Slack adapter not started".to_string()))
    }

    /// Resolve a channel name against the cache and post
    ///
    /// An unknown name and a failed post both degrade to a log line; the
    /// caller sees Ok either way.
    async fn post_to_named_channel(&self, name: &str, text: &str) -> Result<()> {
        let connection = self.connection_ref()?;
        let directory = self
            .directory
            .as_ref()
            .ok_or_else(|| AdapterError::NotRunning("Slack adapter not started".to_string()))?;

        match directory.channel_by_name(name) {
            Some(channel) => {
                info!("Sending message to {} ({})", channel.name, channel.id);
                if let Err(e) = connection.post_message(&channel.id, text).await {
                    error!("Post to {} failed: {}", channel.name, e);
                }
            }
            None => {
                error!("Channel name {} not found", name);
            }
        }
        Ok(())
    }
}

impl Default for SlackAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for SlackAdapter {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_inbound_sender(&mut self, tx: InboundSender) {
        self.inbound_tx = Some(tx);
    }

    async fn init(&mut self, config: &Config) -> Result<()> {
        let slack = &config.adapters.slack;
        if slack.token.trim().is_empty() {
            return Err(AdapterError::InvalidConfig(
                "Slack token not configured".to_string(),
            ));
        }

        self.config = slack.clone();
        self.default_channel = slack.default_channel().to_string();
        info!(
            "Slack adapter initialized (default channel {})",
            self.default_channel
        );
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        if self.config.token.trim().is_empty() {
            return Err(AdapterError::NotConfigured(
                "Slack adapter not initialized".to_string(),
            ));
        }
        let inbound_tx = self.inbound_tx.clone().ok_or_else(|| {
            AdapterError::NotConfigured("Inbound message sender not set".to_string())
        })?;

        let api = Arc::new(SlackApi::new(&self.config.api_base_url, &self.config.token)?);

        // The dispatch loop must never observe a partially built
        // directory; a failed bulk load aborts startup and the error goes
        // back to the host, which owns retry policy.
        let directory = Arc::new(Directory::build(&api).await?);
        info!(
            "Directory cache loaded: {} channels, {} users",
            directory.channel_count(),
            directory.user_count()
        );

        let (connection, event_rx) = rtm::open(Arc::clone(&api));

        let dispatcher = Dispatcher::new(
            ADAPTER_NAME,
            api,
            Arc::clone(&directory),
            inbound_tx,
            self.config.message_concurrency,
        );
        self.dispatch_task = Some(tokio::spawn(dispatcher.run(event_rx)));

        self.directory = Some(directory);
        self.connection = Some(connection);
        self.running = true;

        info!("Slack adapter started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.running = false;

        if let Some(mut connection) = self.connection.take() {
            connection.shutdown();
        }
        if let Some(task) = self.dispatch_task.take() {
            task.abort();
            let _ = task.await;
        }

        info!("Slack adapter stopped");
        Ok(())
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.post_to_named_channel(&self.default_channel, text).await
    }

    async fn send_to_chat(&self, text: &str, room: &str) -> Result<()> {
        self.post_to_named_channel(room, text).await
    }

    async fn reply(&self, original: &Message, text: &str) -> Result<()> {
        let connection = self.connection_ref()?;

        // The reply target is already a concrete channel identifier
        // captured at receipt time; no name resolution is involved.
        if let Err(e) = connection
            .post_message(&original.reply_context.channel_id, text)
            .await
        {
            error!(
                "Reply to {} failed: {}",
                original.reply_context.channel_id, e
            );
        }
        Ok(())
    }
}

//! Base trait for chat-service adapters

use async_trait::async_trait;
use chatrelay_core::bus::Message;
use chatrelay_core::config::schema::Config;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use chatrelay_core::bus::InboundSender;

/// Trait for chat-service adapters
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Get the adapter's registered name
    fn name(&self) -> &str;

    /// Check if the adapter is running
    fn is_running(&self) -> bool;

    /// Set the bot-core inbound message sender
    fn set_inbound_sender(&mut self, tx: InboundSender);

    /// Read and validate this adapter's section of the configuration
    async fn init(&mut self, config: &Config) -> Result<()>;

    /// Build the directory cache, connect, and spawn the dispatch loop
    async fn start(&mut self) -> Result<()>;

    /// Stop the adapter
    async fn stop(&mut self) -> Result<()>;

    /// Send text to the configured default channel
    async fn send(&self, text: &str) -> Result<()>;

    /// Send text to a channel identified by name
    async fn send_to_chat(&self, text: &str, room: &str) -> Result<()>;

    /// Send text back to the channel a message originated from
    async fn reply(&self, original: &Message, text: &str) -> Result<()>;
}

/// Adapter errors
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Adapter not configured: {0}")]
    NotConfigured(String),

    #[error("Adapter not running: {0}")]
    NotRunning(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Directory load failed: {0}")]
    DirectoryLoad(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Send failed: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;

/// Shared adapter handle type
pub type AdapterPtr = Arc<RwLock<dyn Adapter>>;

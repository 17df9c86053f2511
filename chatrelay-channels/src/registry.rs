//! Adapter registry
//!
//! The registry is an explicit object constructed and owned by the host.
//! Adapters are registered by calling [`AdapterRegistry::register`], not as
//! a side effect of module initialization.

use crate::base::{Adapter, AdapterError, AdapterPtr, InboundSender, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry that coordinates the host's adapter instances
pub struct AdapterRegistry {
    /// Registered adapters by name
    adapters: RwLock<HashMap<String, AdapterPtr>>,
    /// Inbound message sender handed to every registered adapter
    inbound_tx: InboundSender,
}

impl AdapterRegistry {
    /// Create a new registry forwarding inbound messages to `inbound_tx`
    pub fn new(inbound_tx: InboundSender) -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
            inbound_tx,
        }
    }

    /// Register an adapter instance
    ///
    /// The registry wires the bot-core inbound sender into the adapter
    /// before storing it. Registering a second adapter under the same name
    /// replaces the first.
    pub async fn register<A: Adapter + 'static>(&self, mut adapter: A) {
        adapter.set_inbound_sender(self.inbound_tx.clone());
        let name = adapter.name().to_string();

        let mut adapters = self.adapters.write().await;
        adapters.insert(
            name.clone(),
            Arc::new(RwLock::new(adapter)) as AdapterPtr,
        );
        tracing::info!("Registered {} adapter", name);
    }

    /// Initialize all registered adapters from configuration
    ///
    /// Stops at the first failure so the host never starts a half-configured
    /// adapter set.
    pub async fn init_all(&self, config: &chatrelay_core::config::schema::Config) -> Result<()> {
        let adapters = self.adapters.read().await;

        for (name, adapter) in adapters.iter() {
            let mut adapter = adapter.write().await;
            adapter.init(config).await.map_err(|e| {
                tracing::error!("Failed to initialize {} adapter: {}", name, e);
                e
            })?;
        }

        Ok(())
    }

    /// Start all registered adapters
    ///
    /// Propagates the first failure (a directory-load error included) so
    /// the host can decide its own retry/backoff policy.
    pub async fn start_all(&self) -> Result<()> {
        let adapters = self.adapters.read().await;

        for (name, adapter) in adapters.iter() {
            tracing::info!("Starting {} adapter...", name);
            let mut adapter = adapter.write().await;
            adapter.start().await.map_err(|e| {
                tracing::error!("Failed to start {} adapter: {}", name, e);
                e
            })?;
        }

        Ok(())
    }

    /// Stop all registered adapters
    pub async fn stop_all(&self) {
        let mut adapters = self.adapters.write().await;

        for (name, adapter) in adapters.iter_mut() {
            tracing::info!("Stopping {} adapter...", name);
            let mut adapter = adapter.write().await;
            if let Err(e) = adapter.stop().await {
                tracing::error!("Failed to stop {} adapter: {}", name, e);
            }
        }

        adapters.clear();
    }

    /// Get an adapter by name
    pub async fn get(&self, name: &str) -> Option<AdapterPtr> {
        let adapters = self.adapters.read().await;
        adapters.get(name).cloned()
    }

    /// Send text through a named adapter's default channel
    pub async fn send(&self, name: &str, text: &str) -> Result<()> {
        let adapters = self.adapters.read().await;
        let adapter = adapters
            .get(name)
            .ok_or_else(|| AdapterError::NotConfigured(format!("Adapter {} not found", name)))?;

        let adapter = adapter.read().await;
        adapter.send(text).await
    }

    /// Check if a named adapter is running
    pub async fn is_running(&self, name: &str) -> bool {
        let adapters = self.adapters.read().await;
        if let Some(adapter) = adapters.get(name) {
            adapter.read().await.is_running()
        } else {
            false
        }
    }

    /// Get the names of all registered adapters
    pub async fn list(&self) -> Vec<String> {
        let adapters = self.adapters.read().await;
        adapters.keys().cloned().collect()
    }
}

//! Event dispatch loop
//!
//! Single loop consuming the inbound event sequence in arrival order.
//! Message events each run in their own task so a slow identity lookup
//! never stalls the loop; everything else is handled inline.

use crate::base::InboundSender;
use crate::slack::api::SlackApi;
use crate::slack::directory::Directory;
use crate::slack::events::RtmEvent;
use crate::slack::translate;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

/// Lifecycle of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Directory cache not yet attached
    AwaitingDirectory,
    /// Consuming the inbound event sequence
    Dispatching,
    /// Invalid authentication observed; absorbing, no further events
    Terminated,
}

/// Single-threaded dispatcher over the inbound event sequence
pub struct Dispatcher {
    state: DispatchState,
    adapter_name: String,
    api: Arc<SlackApi>,
    directory: Arc<Directory>,
    inbound_tx: InboundSender,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Create a dispatcher over a fully built directory
    ///
    /// `message_concurrency` caps how many message-translation tasks may
    /// run at once; acquiring a permit is the loop's only backpressure
    /// point.
    pub fn new(
        adapter_name: impl Into<String>,
        api: Arc<SlackApi>,
        directory: Arc<Directory>,
        inbound_tx: InboundSender,
        message_concurrency: usize,
    ) -> Self {
        Self {
            state: DispatchState::AwaitingDirectory,
            adapter_name: adapter_name.into(),
            api,
            directory,
            inbound_tx,
            permits: Arc::new(Semaphore::new(message_concurrency)),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Consume the event sequence until it ends or authentication is revoked
    ///
    /// Events are classified strictly in arrival order. Completion order
    /// across message-translation tasks is not defined. Returns the final
    /// state: `Terminated` after an invalid-authentication event (the
    /// adapter is then permanently inert), or `Dispatching` if the sequence
    /// simply ended.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<RtmEvent>) -> DispatchState {
        self.state = DispatchState::Dispatching;
        info!("Dispatch loop started");

        while let Some(event) = events.recv().await {
            match event {
                RtmEvent::Hello => {
                    // Handshake greeting, nothing to do
                }
                RtmEvent::Connected { connection_count } => {
                    info!("Session established (connection #{})", connection_count);
                }
                RtmEvent::Message(message_event) => {
                    let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                        break;
                    };

                    let adapter_name = self.adapter_name.clone();
                    let api = Arc::clone(&self.api);
                    let directory = Arc::clone(&self.directory);
                    let inbound_tx = self.inbound_tx.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        translate::translate_and_forward(
                            &adapter_name,
                            &api,
                            &directory,
                            &inbound_tx,
                            message_event,
                        )
                        .await;
                    });
                }
                RtmEvent::PresenceChange(presence) => {
                    debug!("Presence change: {} is {}", presence.user, presence.presence);
                }
                RtmEvent::LatencyReport { latency } => {
                    debug!("Current latency: {:?}", latency);
                }
                RtmEvent::Error { error } => {
                    error!("RTM error {}: {}", error.code, error.msg);
                }
                RtmEvent::InvalidAuth => {
                    error!("Invalid authentication, terminating dispatch loop");
                    self.state = DispatchState::Terminated;
                    break;
                }
                RtmEvent::Pong { .. } | RtmEvent::Goodbye | RtmEvent::Unknown => {
                    // Ignore other events
                }
            }
        }

        info!("Dispatch loop exited");
        self.state
    }
}

//! Canonical message model
//!
//! These types form the boundary between platform adapters and the bot
//! core: adapters translate platform payloads into a `Message`, and the
//! bot core answers through the message's `ReplyContext` without ever
//! seeing platform-specific event shapes.

use tokio::sync::mpsc;

pub mod events;

pub use events::{Channel, Message, ReplyContext, User};

/// Inbound entry point of the bot core
///
/// Adapters forward each successfully translated message on this channel,
/// fire-and-forget. The sequence is unbounded and ordered per adapter.
pub type InboundSender = mpsc::UnboundedSender<Message>;
pub type InboundReceiver = mpsc::UnboundedReceiver<Message>;

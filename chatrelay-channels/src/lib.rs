//! Chat platform adapters for chatrelay
//!
//! This crate provides the adapter trait, the host-owned adapter
//! registry, and the Slack adapter.

pub mod base;
pub mod registry;
pub mod slack;

pub use base::{Adapter, AdapterError, AdapterPtr, InboundSender, Result};
pub use registry::AdapterRegistry;
pub use slack::SlackAdapter;

//! Core types and utilities for chatrelay
//!
//! This crate provides the canonical message model, configuration,
//! error types, and logging setup shared by all chatrelay components.

pub mod bus;
pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

//! Event types for the adapter/bot-core boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat channel known to the platform directory
///
/// Immutable snapshot captured at cache-build time. User-facing calls
/// identify channels by name; protocol calls identify them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Platform channel identifier
    pub id: String,
    /// Channel display name
    pub name: String,
}

impl Channel {
    /// Create a new channel snapshot
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A user known to the platform directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Platform user identifier
    pub id: String,
    /// User display name
    pub name: String,
    /// Full (real) name
    #[serde(default)]
    pub full_name: String,
    /// Email address, when the platform exposes it
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Create a new user record
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            full_name: String::new(),
            email: String::new(),
        }
    }

    /// Set the full name
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

/// Minimal state needed to answer a message at its origin
///
/// Carries only the originating channel identifier, so the bot core can
/// reply without holding on to platform event structures. The identifier
/// is only valid on the connection that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    /// Channel identifier the message arrived on
    pub channel_id: String,
}

impl ReplyContext {
    /// Create a reply context for a channel identifier
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
        }
    }
}

/// Platform-agnostic representation of an inbound chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Registered name of the adapter that produced this message
    pub source_adapter: String,
    /// Message text content
    pub text: String,
    /// Resolved sender identity, when available
    pub from_user: Option<User>,
    /// Where a reply to this message should go
    pub reply_context: ReplyContext,
    /// Message timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new canonical message
    pub fn new(
        source_adapter: impl Into<String>,
        text: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            source_adapter: source_adapter.into(),
            text: text.into(),
            from_user: None,
            reply_context: ReplyContext::new(channel_id),
            timestamp: Utc::now(),
        }
    }

    /// Attach the resolved sender
    pub fn with_user(mut self, user: User) -> Self {
        self.from_user = Some(user);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_new_sets_reply_context() {
        let msg = Message::new("slack", "hello", "C123");
        assert_eq!(msg.source_adapter, "slack");
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.reply_context.channel_id, "C123");
        assert!(msg.from_user.is_none());
    }

    #[test]
    fn test_message_with_user() {
        let user = User::new("U1", "alice")
            .with_full_name("Alice Example")
            .with_email("alice@example.com");
        let msg = Message::new("slack", "hi", "C1").with_user(user.clone());

        assert_eq!(msg.from_user, Some(user));
    }

    #[test]
    fn test_message_round_trips_through_serde() {
        let msg = Message::new("slack", "hi", "C1").with_user(User::new("U1", "alice"));
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();

        assert_eq!(back.reply_context, msg.reply_context);
        assert_eq!(back.from_user, msg.from_user);
    }
}

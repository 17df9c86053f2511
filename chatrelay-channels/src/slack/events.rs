//! RTM event model
//!
//! Wire frames carry a `type` tag and deserialize straight into
//! [`RtmEvent`]; the handler set stays closed and exhaustive-checked.
//! `Connected`, `LatencyReport`, and `InvalidAuth` never appear on the
//! wire — the connection supervisor synthesizes them.

use serde::Deserialize;
use std::time::Duration;

/// A single event on the inbound RTM sequence
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RtmEvent {
    /// Handshake greeting sent right after the transport opens
    Hello,
    /// A chat message
    Message(MessageEvent),
    /// A user's presence changed
    PresenceChange(PresenceChangeEvent),
    /// Protocol-level error reported by the platform
    Error { error: RtmError },
    /// Answer to a keep-alive ping
    Pong {
        #[serde(default)]
        reply_to: Option<u64>,
    },
    /// Server is about to close the connection
    Goodbye,
    /// Session established (synthesized per successful connect)
    #[serde(skip)]
    Connected { connection_count: u64 },
    /// Keep-alive round-trip time (synthesized from ping/pong)
    #[serde(skip)]
    LatencyReport { latency: Duration },
    /// The session's credentials were rejected (synthesized; terminal)
    #[serde(skip)]
    InvalidAuth,
    /// Any event kind this adapter does not handle
    #[serde(other)]
    Unknown,
}

impl RtmEvent {
    /// Parse a wire frame
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// A chat message as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    /// Channel identifier the message was posted to
    #[serde(default)]
    pub channel: String,
    /// Sender's user id; absent for bot and system messages
    #[serde(default)]
    pub user: Option<String>,
    /// Message text
    #[serde(default)]
    pub text: String,
    /// Platform timestamp
    #[serde(default)]
    pub ts: String,
    /// Message subtype (edits, joins, ...), absent for plain messages
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Presence-change payload
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceChangeEvent {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub presence: String,
}

/// Protocol error payload
#[derive(Debug, Clone, Deserialize)]
pub struct RtmError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let event = RtmEvent::parse(r#"{"type":"hello"}"#).unwrap();
        assert!(matches!(event, RtmEvent::Hello));
    }

    #[test]
    fn test_parse_message() {
        let raw = r#"{"type":"message","channel":"C1","user":"U1","text":"hi","ts":"1700000000.000100"}"#;
        let event = RtmEvent::parse(raw).unwrap();

        let RtmEvent::Message(msg) = event else {
            panic!("expected message event");
        };
        assert_eq!(msg.channel, "C1");
        assert_eq!(msg.user.as_deref(), Some("U1"));
        assert_eq!(msg.text, "hi");
        assert!(msg.subtype.is_none());
    }

    #[test]
    fn test_parse_message_without_sender() {
        let raw = r#"{"type":"message","channel":"C1","subtype":"channel_join","text":""}"#;
        let event = RtmEvent::parse(raw).unwrap();

        let RtmEvent::Message(msg) = event else {
            panic!("expected message event");
        };
        assert!(msg.user.is_none());
        assert_eq!(msg.subtype.as_deref(), Some("channel_join"));
    }

    #[test]
    fn test_parse_presence_change() {
        let raw = r#"{"type":"presence_change","user":"U1","presence":"away"}"#;
        let event = RtmEvent::parse(raw).unwrap();

        let RtmEvent::PresenceChange(presence) = event else {
            panic!("expected presence event");
        };
        assert_eq!(presence.user, "U1");
        assert_eq!(presence.presence, "away");
    }

    #[test]
    fn test_parse_error() {
        let raw = r#"{"type":"error","error":{"code":2,"msg":"message text is missing"}}"#;
        let event = RtmEvent::parse(raw).unwrap();

        let RtmEvent::Error { error } = event else {
            panic!("expected error event");
        };
        assert_eq!(error.code, 2);
        assert_eq!(error.msg, "message text is missing");
    }

    #[test]
    fn test_parse_pong() {
        let event = RtmEvent::parse(r#"{"type":"pong","reply_to":7}"#).unwrap();
        assert!(matches!(event, RtmEvent::Pong { reply_to: Some(7) }));
    }

    #[test]
    fn test_unhandled_kind_parses_as_unknown() {
        let event = RtmEvent::parse(r#"{"type":"user_typing","channel":"C1"}"#).unwrap();
        assert!(matches!(event, RtmEvent::Unknown));
    }

    #[test]
    fn test_untagged_frame_is_an_error() {
        assert!(RtmEvent::parse(r#"{"reply_to":1}"#).is_err());
    }
}

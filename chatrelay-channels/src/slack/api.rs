//! Slack Web API client
//!
//! Thin boundary over the platform's HTTP API: directory bulk loads, the
//! single-user lookup, session handshake, and outbound posting. Every
//! response carries the `ok`/`error` envelope, decoded once here; auth
//! rejections are classified separately so callers can tell a revoked
//! token from a transient failure.

use crate::base::{AdapterError, Result};
use chatrelay_core::bus::{Channel, User};
use serde::Deserialize;
use std::time::Duration;

/// Tokens the platform rejects outright, as opposed to transient failures
fn is_auth_error(code: &str) -> bool {
    matches!(
        code,
        "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked" | "token_expired"
    )
}

/// rtm.connect response fields needed to open the event stream
#[derive(Debug, Clone, Deserialize)]
pub struct RtmSession {
    /// WebSocket URL for the real-time session
    pub url: String,
}

/// Client for the Slack Web API
pub struct SlackApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SlackApi {
    /// Create a client against a Web API base URL
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AdapterError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Open a real-time session; the returned URL is single-use
    pub async fn rtm_connect(&self) -> Result<RtmSession> {
        let payload = self.get("rtm.connect", &[]).await?;
        serde_json::from_value(payload)
            .map_err(|e| AdapterError::Api(format!("rtm.connect payload malformed: {}", e)))
    }

    /// Fetch the full channel list
    pub async fn list_channels(&self) -> Result<Vec<Channel>> {
        let payload = self
            .get(
                "conversations.list",
                &[("limit", "1000"), ("exclude_archived", "true")],
            )
            .await?;
        let wire: WireChannelList = serde_json::from_value(payload).map_err(|e| {
            AdapterError::Api(format!("conversations.list payload malformed: {}", e))
        })?;
        Ok(wire.channels.into_iter().map(Channel::from).collect())
    }

    /// Fetch the full user list
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let payload = self.get("users.list", &[("limit", "1000")]).await?;
        let wire: WireUserList = serde_json::from_value(payload)
            .map_err(|e| AdapterError::Api(format!("users.list payload malformed: {}", e)))?;
        Ok(wire.members.into_iter().map(User::from).collect())
    }

    /// Fetch a single user by id
    pub async fn user_info(&self, user_id: &str) -> Result<User> {
        let payload = self.get("users.info", &[("user", user_id)]).await?;
        let wire: WireUserInfo = serde_json::from_value(payload)
            .map_err(|e| AdapterError::Api(format!("users.info payload malformed: {}", e)))?;
        Ok(wire.user.into())
    }

    /// Post text to a channel reference as the bot's own identity
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        self.post(
            "chat.postMessage",
            serde_json::json!({
                "channel": channel_id,
                "text": text,
                "as_user": true,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn get(&self, method: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| AdapterError::Api(format!("{} request failed: {}", method, e)))?;
        Self::check(method, response).await
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Api(format!("{} request failed: {}", method, e)))?;
        Self::check(method, response).await
    }

    /// Decode the `ok`/`error` envelope shared by every Web API method
    async fn check(method: &str, response: reqwest::Response) -> Result<serde_json::Value> {
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Api(format!("{} returned invalid JSON: {}", method, e)))?;

        if payload.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Ok(payload);
        }

        let code = payload
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown_error");
        if is_auth_error(code) {
            Err(AdapterError::Auth(format!("{} rejected: {}", method, code)))
        } else {
            Err(AdapterError::Api(format!("{} failed: {}", method, code)))
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireChannelList {
    #[serde(default)]
    channels: Vec<WireChannel>,
}

#[derive(Debug, Deserialize)]
struct WireChannel {
    id: String,
    name: String,
}

impl From<WireChannel> for Channel {
    fn from(channel: WireChannel) -> Self {
        Channel::new(channel.id, channel.name)
    }
}

#[derive(Debug, Deserialize)]
struct WireUserList {
    #[serde(default)]
    members: Vec<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireUserInfo {
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    profile: WireProfile,
}

#[derive(Debug, Default, Deserialize)]
struct WireProfile {
    #[serde(default)]
    real_name: String,
    #[serde(default)]
    email: String,
}

impl From<WireUser> for User {
    fn from(user: WireUser) -> Self {
        User::new(user.id, user.name)
            .with_full_name(user.profile.real_name)
            .with_email(user.profile.email)
    }
}

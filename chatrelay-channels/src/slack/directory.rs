//! Channel and user directory cache

use crate::base::{AdapterError, Result};
use crate::slack::api::SlackApi;
use chatrelay_core::bus::{Channel, User};
use std::collections::HashMap;
use tracing::debug;

/// In-memory snapshot of the platform's channel/user directory
///
/// Built exactly once at adapter start and read-only afterward; lookups
/// never mutate and never block on I/O. There is no refresh path — a
/// channel renamed or a user added on the platform after startup is not
/// reflected here.
#[derive(Debug)]
pub struct Directory {
    channels_by_name: HashMap<String, Channel>,
    users_by_name: HashMap<String, User>,
    users_by_id: HashMap<String, User>,
}

impl Directory {
    /// Bulk-load the directory from the platform
    ///
    /// Two bulk remote calls; either failing is fatal to startup, and the
    /// error is returned so the caller can decide retry policy.
    pub async fn build(api: &SlackApi) -> Result<Self> {
        let channels = api
            .list_channels()
            .await
            .map_err(|e| AdapterError::DirectoryLoad(format!("channel list fetch: {}", e)))?;
        let users = api
            .list_users()
            .await
            .map_err(|e| AdapterError::DirectoryLoad(format!("user list fetch: {}", e)))?;

        Ok(Self::from_parts(channels, users))
    }

    /// Build the lookup maps from already-fetched lists
    pub fn from_parts(channels: Vec<Channel>, users: Vec<User>) -> Self {
        let mut channels_by_name = HashMap::with_capacity(channels.len());
        for channel in channels {
            debug!("Loaded channel {} ({})", channel.name, channel.id);
            channels_by_name.insert(channel.name.clone(), channel);
        }

        let mut users_by_name = HashMap::with_capacity(users.len());
        let mut users_by_id = HashMap::with_capacity(users.len());
        for user in users {
            users_by_name.insert(user.name.clone(), user.clone());
            users_by_id.insert(user.id.clone(), user);
        }

        Self {
            channels_by_name,
            users_by_name,
            users_by_id,
        }
    }

    /// Look up a channel by display name
    pub fn channel_by_name(&self, name: &str) -> Option<&Channel> {
        self.channels_by_name.get(name)
    }

    /// Look up a user by display name
    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users_by_name.get(name)
    }

    /// Look up a user by platform id
    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.users_by_id.get(id)
    }

    /// Number of cached channels
    pub fn channel_count(&self) -> usize {
        self.channels_by_name.len()
    }

    /// Number of cached users
    pub fn user_count(&self) -> usize {
        self.users_by_id.len()
    }
}

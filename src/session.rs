//! Per-user session data and the store it lives in.
//!
//! The translator keeps each user's preferred target languages and their
//! translation history; news search keeps its client id and market. Persistence is behind [`SessionStore`];
//! [`InMemorySessionStore`] backs the HTTP server and the tests.

use crate::history::HistoryEntry;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Target languages picked by the user; `None` until they configure any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,

    /// Most recent first
    #[serde(default)]
    pub translation_history: Vec<HistoryEntry>,

    /// Client id the search service assigned to this user, echoed back on
    /// every search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_client_id: Option<String>,

    /// Market for news results, e.g. `en-US`; the service picks one when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_market: Option<String>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a user's data; unknown users get an empty `UserData`.
    async fn load(&self, user_id: &str) -> Result<UserData>;

    async fn save(&self, user_id: &str, data: UserData) -> Result<()>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    users: RwLock<HashMap<String, UserData>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user_id: &str) -> Result<UserData> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &str, data: UserData) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user_id.to_string(), data);
        Ok(())
    }
}

//! In-memory game session store
//!
//! Maps client-chosen session ids to opaque JSON game state for the lifetime
//! of the process. Ids are taken as given: two clients that pick the same id
//! share a session.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-wide session state.
///
/// Values are replaced whole under the write lock, so a reader observes
/// either the previous state or the new one and never a mixture.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Value>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `state` under `id`, replacing whatever was there.
    pub async fn save(&self, id: &str, state: Value) {
        let previous = self.sessions.write().await.insert(id.to_string(), state);
        tracing::debug!(session_id = %id, replaced = previous.is_some(), "Saved game state");
    }

    /// Stored state for `id`, or an empty object when nothing was saved.
    pub async fn load(&self, id: &str) -> Value {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    #[allow(dead_code)] // Diagnostics
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

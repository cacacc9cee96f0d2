use std::{collections::HashMap, fmt::Display, sync::Arc};

use tokio::sync::RwLock;

use crate::models::RankedResultSet;

/// Keys of the session-scoped slots
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    BlendResults,
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::BlendResults => write!(f, "blendResults"),
        }
    }
}

/// Session-scoped holder of the most recent ranked result set
///
/// Slots hold JSON text, the same shape the service sent. Clones share the
/// same slots, so the controller and the reveal view can each keep a handle.
/// A fresh store is a fresh session: nothing carries over.
#[derive(Clone, Default)]
pub struct ResultStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored result set
    pub async fn put(&self, set: &RankedResultSet) {
        let json = match serde_json::to_string(set) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Result set serialization error");
                return;
            }
        };

        let mut slots = self.slots.write().await;
        slots.insert(StoreKey::BlendResults.to_string(), json);
        tracing::debug!(items = set.len(), key = %StoreKey::BlendResults, "Stored result set");
    }

    /// Reads the stored result set without removing it
    pub async fn take(&self) -> Option<RankedResultSet> {
        let slots = self.slots.read().await;
        let json = slots.get(&StoreKey::BlendResults.to_string())?;

        match serde_json::from_str(json) {
            Ok(set) => Some(set),
            Err(e) => {
                tracing::warn!(error = %e, "Stored result set could not be decoded");
                None
            }
        }
    }

    /// Drops everything, as when the session ends
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }

    /// Raw JSON held under a key
    pub async fn raw(&self, key: &StoreKey) -> Option<String> {
        self.slots.read().await.get(&key.to_string()).cloned()
    }

    #[cfg(test)]
    pub(crate) async fn put_raw(&self, key: &StoreKey, json: &str) {
        self.slots
            .write()
            .await
            .insert(key.to_string(), json.to_string());
    }
}

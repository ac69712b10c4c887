//! Process-local draft store, used when no database path is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DraftError;
use crate::store::traits::DraftStore;

#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self.drafts.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, document: &str) -> Result<(), DraftError> {
        self.drafts
            .write()
            .await
            .insert(key.to_string(), document.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool, DraftError> {
        Ok(self.drafts.write().await.remove(key).is_some())
    }
}

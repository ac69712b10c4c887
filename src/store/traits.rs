//! Draft persistence contract.
//!
//! A draft is an opaque JSON document stored under a string key, mirroring a
//! browser key-value store. Parsing and tolerance of malformed documents are
//! the caller's business.

use async_trait::async_trait;

use crate::error::DraftError;

#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Raw document stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, DraftError>;

    /// Insert or replace the document stored under `key`.
    async fn save(&self, key: &str, document: &str) -> Result<(), DraftError>;

    /// Remove the document. Returns whether one existed.
    async fn clear(&self, key: &str) -> Result<bool, DraftError>;
}

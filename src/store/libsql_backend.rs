//! libSQL draft store. Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::DraftError;
use crate::store::migrations;
use crate::store::traits::DraftStore;

/// Keeps a single connection reused for every operation.
pub struct LibSqlDraftStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlDraftStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DraftError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DraftError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DraftError::Open(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Draft database opened");
        Ok(store)
    }

    /// In-memory database, for tests.
    pub async fn new_memory() -> Result<Self, DraftError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DraftError::Open(format!("Failed to create in-memory database: {e}")))?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DraftError> {
        let conn = db
            .connect()
            .map_err(|e| DraftError::Open(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

#[async_trait]
impl DraftStore for LibSqlDraftStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DraftError> {
        let mut rows = self
            .conn
            .query("SELECT document FROM drafts WHERE key = ?1", params![key])
            .await
            .map_err(|e| DraftError::Query(format!("load_draft: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let document: String = row
                    .get(0)
                    .map_err(|e| DraftError::Query(format!("load_draft: {e}")))?;
                Ok(Some(document))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DraftError::Query(format!("load_draft: {e}"))),
        }
    }

    async fn save(&self, key: &str, document: &str) -> Result<(), DraftError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO drafts (key, document, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET document = ?2, updated_at = ?3",
                params![key, document, now],
            )
            .await
            .map_err(|e| DraftError::Query(format!("save_draft: {e}")))?;
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool, DraftError> {
        let count = self
            .conn
            .execute("DELETE FROM drafts WHERE key = ?1", params![key])
            .await
            .map_err(|e| DraftError::Query(format!("clear_draft: {e}")))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_document() {
        let store = LibSqlDraftStore::new_memory().await.unwrap();
        store.save("creditplan_form_data", "{}").await.unwrap();
        store
            .save("creditplan_form_data", r#"{"nome":"Mario"}"#)
            .await
            .unwrap();

        let doc = store.load("creditplan_form_data").await.unwrap();
        assert_eq!(doc.as_deref(), Some(r#"{"nome":"Mario"}"#));
        assert!(store.load("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_reports_existence() {
        let store = LibSqlDraftStore::new_memory().await.unwrap();
        assert!(!store.clear("k").await.unwrap());
        store.save("k", "{}").await.unwrap();
        assert!(store.clear("k").await.unwrap());
        assert!(store.load("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts").join("funnel.db");

        {
            let store = LibSqlDraftStore::new_local(&path).await.unwrap();
            store.save("k", r#"{"annoNascita":"1958"}"#).await.unwrap();
        }

        let reopened = LibSqlDraftStore::new_local(&path).await.unwrap();
        assert_eq!(
            reopened.load("k").await.unwrap().as_deref(),
            Some(r#"{"annoNascita":"1958"}"#)
        );
    }
}

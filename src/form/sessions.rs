//! Per-visitor wizard sessions.
//!
//! Every browser tab sends its own session id. Each id gets its own
//! orchestrator whose draft lives under `<draft_key>:<session id>`, so two
//! visitors never see or overwrite each other's answers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::orchestrator::FormOrchestrator;
use crate::config::FormConfig;
use crate::store::DraftStore;
use crate::submission::LeadSink;

/// Request header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";

const MAX_SESSION_ID_LEN: usize = 64;

/// Registry of live wizard sessions.
pub struct FormSessions {
    config: FormConfig,
    drafts: Arc<dyn DraftStore>,
    sink: Arc<dyn LeadSink>,
    // TODO: evict sessions idle past a configurable TTL; their drafts already outlive them.
    sessions: RwLock<HashMap<String, Arc<FormOrchestrator>>>,
}

impl FormSessions {
    pub fn new(config: FormConfig, drafts: Arc<dyn DraftStore>, sink: Arc<dyn LeadSink>) -> Self {
        Self {
            config,
            drafts,
            sink,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Ids are 1 to 64 ASCII letters, digits, `-` or `_`.
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_SESSION_ID_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    /// Draft key used for `id`.
    pub fn draft_key(&self, id: &str) -> String {
        format!("{}:{id}", self.config.draft_key)
    }

    /// The orchestrator for `id`, started (and its draft restored) on first use.
    pub async fn get(&self, id: &str) -> Arc<FormOrchestrator> {
        if let Some(form) = self.sessions.read().await.get(id) {
            return Arc::clone(form);
        }

        let mut sessions = self.sessions.write().await;
        if let Some(form) = sessions.get(id) {
            return Arc::clone(form);
        }
        let config = FormConfig {
            draft_key: self.draft_key(id),
            ..self.config.clone()
        };
        let form = Arc::new(
            FormOrchestrator::start(config, Arc::clone(&self.drafts), Arc::clone(&self.sink))
                .await,
        );
        sessions.insert(id.to_string(), Arc::clone(&form));
        tracing::debug!(session = %id, live = sessions.len(), "Started form session");
        form
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

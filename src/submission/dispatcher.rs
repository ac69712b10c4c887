//! Lead dispatcher: one JSON POST per submission attempt, no retries.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SubmissionConfig;
use crate::error::{GENERIC_SUBMIT_MESSAGE, SubmissionError};
use crate::submission::payload::SubmissionPayload;

/// What the CRM answered to an accepted lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub status: u16,
    /// Response body, when it was JSON.
    pub body: Option<serde_json::Value>,
}

/// Destination for completed leads.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload)
    -> Result<SubmissionReceipt, SubmissionError>;
}

/// Posts leads to the per-profile CRM webhooks.
pub struct HttpLeadSink {
    config: SubmissionConfig,
    client: reqwest::Client,
}

impl HttpLeadSink {
    pub fn new(config: SubmissionConfig) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SubmissionError::Network {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LeadSink for HttpLeadSink {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let url = self.config.endpoint_for(payload.user_position);
        let position = payload.user_position;

        let resp = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(%position, timeout = ?self.config.timeout, "Lead submission timed out");
                    SubmissionError::Timeout {
                        timeout: self.config.timeout,
                    }
                } else {
                    warn!(%position, error = %e, "Lead submission failed");
                    SubmissionError::Network {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = error_message(&text);
            warn!(%position, status = status.as_u16(), %message, "Lead endpoint rejected submission");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(%position, status = status.as_u16(), "Lead submitted");
        Ok(SubmissionReceipt {
            status: status.as_u16(),
            body: serde_json::from_str(&text).ok(),
        })
    }
}

/// The endpoint's `{"error": "..."}` message, or the generic one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_SUBMIT_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_surfaced() {
        assert_eq!(
            error_message(r#"{"error":"Telefono non valido"}"#),
            "Telefono non valido"
        );
    }

    #[test]
    fn unusable_error_bodies_fall_back() {
        for body in ["", "<html>502</html>", r#"{"error":""}"#, r#"{"error":42}"#, r#"{"msg":"x"}"#] {
            assert_eq!(error_message(body), GENERIC_SUBMIT_MESSAGE, "body: {body}");
        }
    }
}

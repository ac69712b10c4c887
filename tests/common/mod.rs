//! Shared helpers: a stub CRM that records every lead it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use lead_funnel::config::SubmissionConfig;

/// Maximum time any test is allowed to run before we consider it hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How the stub CRM answers.
#[derive(Clone)]
pub enum CrmReply {
    Accept,
    /// Non-2xx with the given JSON body.
    Reject(StatusCode, Value),
    /// Non-2xx with a plain-text body.
    RejectText(StatusCode, &'static str),
    /// Accept after sleeping.
    Stall(Duration),
}

#[derive(Clone)]
struct CrmState {
    reply: CrmReply,
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

pub struct StubCrm {
    pub port: u16,
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

impl StubCrm {
    /// Leads received so far, as `(endpoint, body)`.
    pub fn received(&self) -> Vec<(String, Value)> {
        self.received.lock().unwrap().clone()
    }

    pub fn submission_config(&self) -> SubmissionConfig {
        SubmissionConfig::new(
            format!("http://127.0.0.1:{}/leads/pensionato", self.port),
            format!("http://127.0.0.1:{}/leads/dipendente", self.port),
        )
    }
}

async fn receive(
    State(state): State<CrmState>,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.received.lock().unwrap().push((endpoint, body));
    match state.reply {
        CrmReply::Accept => (StatusCode::OK, json!({"ok": true}).to_string()),
        CrmReply::Reject(status, body) => (status, body.to_string()),
        CrmReply::RejectText(status, text) => (status, text.to_string()),
        CrmReply::Stall(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, json!({"ok": true}).to_string())
        }
    }
}

/// Start the stub CRM on a random port.
pub async fn start_crm(reply: CrmReply) -> StubCrm {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/leads/{endpoint}", post(receive))
        .with_state(CrmState {
            reply,
            received: Arc::clone(&received),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    StubCrm { port, received }
}

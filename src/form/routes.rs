//! REST endpoints driving the wizard.
//!
//! Every `/api/form` request names its session in the `x-session-id` header.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::dipendente::DipendentePatch;
use super::flow::Advance;
use super::model::{ContactPatch, UserPosition};
use super::orchestrator::{ContactOutcome, FormOrchestrator};
use super::pensionato::PensionatoPatch;
use super::sessions::{FormSessions, SESSION_HEADER};
use crate::error::{Error, FormError};

/// Shared state for the form routes.
#[derive(Clone)]
pub struct FormRouteState {
    pub sessions: Arc<FormSessions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest {
    user_position: UserPosition,
}

#[derive(Debug, Deserialize)]
struct ConsentRequest {
    accepted: bool,
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(json!({"error": message.to_string()}))).into_response()
}

fn form_error(err: FormError) -> Response {
    let status = match err {
        FormError::WrongPhase { .. } | FormError::SubmissionInFlight => StatusCode::CONFLICT,
        FormError::NoProfileSelected | FormError::NotOnSummary => StatusCode::BAD_REQUEST,
        FormError::ConsentMissing
        | FormError::InvalidContact
        | FormError::FlowIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_response(status, err)
}

/// The caller's orchestrator, or 400 when the session header is missing or malformed.
async fn session(state: &FormRouteState, headers: &HeaderMap) -> Result<Arc<FormOrchestrator>, Response> {
    let id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| FormSessions::is_valid_id(id))
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Missing or invalid {SESSION_HEADER} header"),
            )
        })?;
    Ok(state.sessions.get(id).await)
}

async fn view_response(form: &FormOrchestrator) -> Response {
    Json(form.view().await).into_response()
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// GET /api/form
async fn get_form(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    match session(&state, &headers).await {
        Ok(form) => view_response(&form).await,
        Err(resp) => resp,
    }
}

/// PATCH /api/form/contact
async fn update_contact(
    State(state): State<FormRouteState>,
    headers: HeaderMap,
    Json(patch): Json<ContactPatch>,
) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.update_contact(patch).await {
        Ok(()) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// POST /api/form/contact
///
/// 422 with per-field errors when any contact field is invalid.
async fn submit_contact(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.submit_contact().await {
        Ok(ContactOutcome::Accepted(_)) => view_response(&form).await,
        Ok(ContactOutcome::Rejected(fields)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": FormError::InvalidContact.to_string(), "fields": fields})),
        )
            .into_response(),
        Err(e) => form_error(e),
    }
}

/// POST /api/form/profile
async fn select_profile(
    State(state): State<FormRouteState>,
    headers: HeaderMap,
    Json(req): Json<ProfileRequest>,
) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.select_profile(req.user_position).await {
        Ok(_) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// PATCH /api/form/pensionato
async fn update_pensionato(
    State(state): State<FormRouteState>,
    headers: HeaderMap,
    Json(patch): Json<PensionatoPatch>,
) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.update_pensionato(patch).await {
        Ok(()) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// PATCH /api/form/dipendente
async fn update_dipendente(
    State(state): State<FormRouteState>,
    headers: HeaderMap,
    Json(patch): Json<DipendentePatch>,
) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.update_dipendente(patch).await {
        Ok(()) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// POST /api/form/next
///
/// A failed answer is 422 with the validator message; the view keeps it too.
async fn next(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.next().await {
        Ok(Advance::Moved(_)) | Ok(Advance::AtEnd) => view_response(&form).await,
        Ok(Advance::Rejected(message)) => error_response(StatusCode::UNPROCESSABLE_ENTITY, message),
        Err(e) => form_error(e),
    }
}

/// POST /api/form/back
async fn back(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.go_back().await {
        Ok(_) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// POST /api/form/consent
async fn set_consent(
    State(state): State<FormRouteState>,
    headers: HeaderMap,
    Json(req): Json<ConsentRequest>,
) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.set_consent(req.accepted).await {
        Ok(()) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// POST /api/form/submit
///
/// Dispatcher failures are 502 and carry the banner text. An answer that no
/// longer validates is 422 and the view points at its question.
async fn submit(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.submit().await {
        Ok(outcome) => Json(json!({
            "status": "submitted",
            "redirect": outcome.redirect,
            "receipt": outcome.receipt,
        }))
        .into_response(),
        Err(Error::Form(e)) => form_error(e),
        Err(Error::Submission(e)) => error_response(StatusCode::BAD_GATEWAY, e.user_message()),
    }
}

/// DELETE /api/form/error
async fn dismiss_error(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    form.dismiss_error().await;
    view_response(&form).await
}

/// DELETE /api/form
async fn reset(State(state): State<FormRouteState>, headers: HeaderMap) -> Response {
    let form = match session(&state, &headers).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match form.reset().await {
        Ok(()) => view_response(&form).await,
        Err(e) => form_error(e),
    }
}

/// Build the wizard REST routes.
pub fn form_routes(state: FormRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/form", get(get_form).delete(reset))
        .route("/api/form/contact", patch(update_contact).post(submit_contact))
        .route("/api/form/profile", post(select_profile))
        .route("/api/form/pensionato", patch(update_pensionato))
        .route("/api/form/dipendente", patch(update_dipendente))
        .route("/api/form/next", post(next))
        .route("/api/form/back", post(back))
        .route("/api/form/consent", post(set_consent))
        .route("/api/form/submit", post(submit))
        .route("/api/form/error", delete(dismiss_error))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::FormConfig;
    use crate::error::SubmissionError;
    use crate::store::MemoryDraftStore;
    use crate::submission::{LeadSink, SubmissionPayload, SubmissionReceipt};

    struct UnreachableSink;

    #[async_trait]
    impl LeadSink for UnreachableSink {
        async fn submit(
            &self,
            _payload: &SubmissionPayload,
        ) -> Result<SubmissionReceipt, SubmissionError> {
            Err(SubmissionError::Network {
                reason: "not used in route tests".into(),
            })
        }
    }

    async fn app() -> Router {
        let sessions = FormSessions::new(
            FormConfig::default(),
            Arc::new(MemoryDraftStore::new()),
            Arc::new(UnreachableSink),
        );
        form_routes(FormRouteState {
            sessions: Arc::new(sessions),
        })
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        call_as(app, Some("tab-1"), method, uri, body).await
    }

    async fn call_as(
        app: Router,
        session: Option<&str>,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(app().await, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn profile_before_contact_conflicts() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/form/profile",
            Some(r#"{"userPosition":"PENSIONATO"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("collecting_contact"));
    }

    #[tokio::test]
    async fn flow_updates_need_a_profile() {
        let (status, _) = call(
            app().await,
            "PATCH",
            "/api/form/pensionato",
            Some(r#"{"amount":10000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_option_values_are_rejected() {
        let (status, _) = call(
            app().await,
            "PATCH",
            "/api/form/dipendente",
            Some(r#"{"tipo":"LIBERO PROFESSIONISTA"}"#),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn form_routes_need_a_session() {
        let (status, body) = call_as(app().await, None, "GET", "/api/form", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains(SESSION_HEADER));

        let (status, _) = call_as(app().await, Some("a/b"), "GET", "/api/form", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call_as(app().await, None, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn sessions_do_not_share_answers() {
        let app = app().await;
        let (status, _) = call_as(
            app.clone(),
            Some("alice"),
            "PATCH",
            "/api/form/contact",
            Some(r#"{"nome":"Alice"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, alice) = call_as(app.clone(), Some("alice"), "GET", "/api/form", None).await;
        let (_, bob) = call_as(app, Some("bob"), "GET", "/api/form", None).await;
        assert_eq!(alice["contact"]["nome"], "Alice");
        assert_eq!(bob["contact"]["nome"], "");
    }

    #[test]
    fn form_errors_map_to_statuses() {
        assert_eq!(
            form_error(FormError::SubmissionInFlight).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            form_error(FormError::ConsentMissing).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            form_error(FormError::NoProfileSelected).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            form_error(FormError::FlowIncomplete {
                message: "Non è possibile procedere".into()
            })
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

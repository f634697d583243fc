//! Webhook HTTP server.
//!
//! Each inbound event is handled independently: a failure while replying
//! to one event is logged and never aborts the rest of the batch.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::json;

use crate::agent::Orchestrator;
use crate::channels::line::{self, LineChannel, WebhookEvent, WebhookPayload};

/// Shared, read-only per-request state.
pub struct AppState {
    pub channel_secret: SecretString,
    pub line: LineChannel,
    pub orchestrator: Orchestrator,
}

/// Build the webhook router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_health() -> &'static str {
    "OK"
}

/// POST /webhook — verify the signature, then process each event.
async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !line::verify_signature(&state.channel_secret, &body, signature) {
        tracing::warn!("Webhook signature verification failed");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid signature"})),
        )
            .into_response();
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid payload"})),
            )
                .into_response();
        }
    };

    for event in &payload.events {
        handle_event(&state, event).await;
    }

    (StatusCode::OK, "OK").into_response()
}

/// Process one event. Failures are logged, never propagated.
async fn handle_event(state: &AppState, event: &WebhookEvent) {
    let Some(text) = event.text_message() else {
        return;
    };
    let Some(reply_token) = event.reply_token.as_deref() else {
        tracing::warn!("Text message event without reply token");
        return;
    };

    tracing::info!(text, "Inbound message");

    // Typing indicator: detached and best-effort, never joined here.
    if let Some(user_id) = event.source.as_ref().and_then(|s| s.user_id.clone()) {
        let channel = state.line.clone();
        tokio::spawn(async move {
            channel.send_loading(&user_id).await;
        });
    }

    let reply = state.orchestrator.respond(text).await;
    if let Err(e) = state.line.reply(reply_token, &reply).await {
        tracing::error!(error = %e, "Failed to deliver reply");
    }
}

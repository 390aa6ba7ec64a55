//! HTTP routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use chatrelay_channel::line::{SIGNATURE_HEADER, WebhookPayload, verify};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Receives LINE webhook deliveries.
///
/// The body is verified against `X-Line-Signature` before it is decoded.
/// Each text message is relayed on its own task so the webhook is
/// acknowledged without waiting for completions.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    verify(&state.channel_secret, &body, signature)?;

    let payload = WebhookPayload::parse(&body)?;
    let messages = payload.text_messages();
    tracing::debug!(
        events = payload.events.len(),
        text_messages = messages.len(),
        "accepted webhook"
    );

    for message in messages {
        state.dispatch(message);
    }

    Ok(Json(json!({ "message": "OK" })))
}

/// Liveness check reporting the live session count.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.relay.store().len(),
    }))
}

//! HTTP-facing error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatrelay_channel::WebhookError;
use serde_json::json;

/// Webhook request rejections.
#[derive(Debug)]
pub enum ApiError {
    /// The signature was missing or wrong.
    Unauthenticated(WebhookError),
    /// The body could not be decoded.
    BadPayload(WebhookError),
}

impl From<WebhookError> for ApiError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                Self::Unauthenticated(e)
            }
            WebhookError::MalformedPayload { .. } => Self::BadPayload(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Unauthenticated(e) => {
                tracing::warn!(error = %e, "rejected webhook");
                "Invalid signature"
            }
            Self::BadPayload(e) => {
                tracing::warn!(error = %e, "rejected webhook");
                "Invalid payload"
            }
        };

        (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
    }
}

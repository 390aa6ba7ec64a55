use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chatrelay_ai::{CompletionEngine, CompletionError};
use chatrelay_channel::line::{SIGNATURE_HEADER, sign};
use chatrelay_channel::{ChannelError, MessagingChannel, ReplyTarget};
use chatrelay_conversation::Turn;
use chatrelay_relay::{RelayConfig, RelayOrchestrator};
use chatrelay_server::{AppState, router};
use rootcause::prelude::Report;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "test-channel-secret";

/// Replies with the last user turn, prefixed.
struct EchoEngine;

#[async_trait]
impl CompletionEngine for EchoEngine {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let last = turns.last().map(|t| t.content.as_str()).unwrap_or_default();
        Ok(format!("echo: {last}"))
    }

    fn model(&self) -> &str {
        "echo"
    }
}

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(ReplyTarget, Vec<String>)>>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<(ReplyTarget, Vec<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingChannel for RecordingChannel {
    async fn send_reply(
        &self,
        target: &ReplyTarget,
        chunks: &[String],
    ) -> Result<(), Report<ChannelError>> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), chunks.to_vec()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn app() -> (Router, Arc<RecordingChannel>) {
    let config = RelayConfig::default();
    let store = config.session_store().expect("store");
    let engine: Arc<dyn CompletionEngine> = Arc::new(EchoEngine);
    let recording = Arc::new(RecordingChannel::default());
    let channel: Arc<dyn MessagingChannel> = recording.clone();
    let relay = RelayOrchestrator::new(store, engine, channel, &config);
    (router(Arc::new(AppState::new(relay, SECRET))), recording)
}

fn text_event(user_id: &str, reply_token: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "source": {"type": "user", "userId": user_id},
        "message": {"type": "text", "id": "1", "text": text}
    })
}

fn webhook_request(body: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body.to_vec())).unwrap()
}

fn signed_request(payload: &Value) -> Request<Body> {
    let body = serde_json::to_vec(payload).unwrap();
    let signature = sign(SECRET, &body).unwrap();
    webhook_request(&body, Some(&signature))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn wait_for_replies(
    channel: &RecordingChannel,
    count: usize,
) -> Vec<(ReplyTarget, Vec<String>)> {
    for _ in 0..100 {
        let sent = channel.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    channel.sent()
}

#[tokio::test]
async fn signed_text_message_is_relayed() {
    let (app, channel) = app();
    let payload = json!({
        "destination": "Ubot",
        "events": [text_event("U123", "reply-1", "hello")]
    });

    let (status, body) = send(&app, signed_request(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "OK"}));

    let sent = wait_for_replies(&channel, 1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ReplyTarget::new("reply-1", "U123"));
    assert_eq!(sent[0].1, vec!["echo: hello".to_string()]);

    let health = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, health).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "sessions": 1}));
}

#[tokio::test]
async fn each_text_event_gets_its_own_reply() {
    let (app, channel) = app();
    let payload = json!({
        "events": [
            text_event("U1", "reply-1", "first"),
            text_event("U2", "reply-2", "second")
        ]
    });

    let (status, _) = send(&app, signed_request(&payload)).await;
    assert_eq!(status, StatusCode::OK);

    let mut sent = wait_for_replies(&channel, 2).await;
    sent.sort_by(|a, b| a.0.reply_token.as_str().cmp(b.0.reply_token.as_str()));
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, vec!["echo: first".to_string()]);
    assert_eq!(sent[1].1, vec!["echo: second".to_string()]);
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let (app, channel) = app();
    let body = serde_json::to_vec(&json!({"events": []})).unwrap();

    let (status, body) = send(&app, webhook_request(&body, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid signature"}));
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn wrong_signature_is_rejected() {
    let (app, channel) = app();
    let payload = json!({"events": [text_event("U123", "reply-1", "hello")]});
    let body = serde_json::to_vec(&payload).unwrap();
    let signature = sign("some-other-secret", &body).unwrap();

    let (status, body) = send(&app, webhook_request(&body, Some(&signature))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid signature"}));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn malformed_payload_is_rejected() {
    let (app, _) = app();
    let body = b"{not json";
    let signature = sign(SECRET, body).unwrap();

    let (status, body) = send(&app, webhook_request(body, Some(&signature))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid payload"}));
}

#[tokio::test]
async fn non_text_events_are_acknowledged_and_ignored() {
    let (app, channel) = app();
    let payload = json!({
        "events": [
            {
                "type": "follow",
                "replyToken": "reply-1",
                "source": {"type": "user", "userId": "U123"}
            },
            {
                "type": "message",
                "replyToken": "reply-2",
                "source": {"type": "user", "userId": "U123"},
                "message": {"type": "sticker", "id": "2", "packageId": "1", "stickerId": "1"}
            }
        ]
    });

    let (status, body) = send(&app, signed_request(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "OK"}));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn health_reports_no_sessions_initially() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "sessions": 0}));
}

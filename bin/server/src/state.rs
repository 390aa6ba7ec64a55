//! Shared application state.

use chatrelay_ai::CompletionEngine;
use chatrelay_channel::{InboundMessage, MessagingChannel};
use chatrelay_relay::{RelayOrchestrator, RelayOutcome};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// The relay as wired by the server.
pub type Relay = RelayOrchestrator<Arc<dyn CompletionEngine>, Arc<dyn MessagingChannel>>;

/// Shared application state.
pub struct AppState {
    /// The relay orchestrator, owning the session store.
    pub relay: Arc<Relay>,
    /// LINE channel secret for webhook verification.
    pub channel_secret: String,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(relay: Relay, channel_secret: impl Into<String>) -> Self {
        Self {
            relay: Arc::new(relay),
            channel_secret: channel_secret.into(),
        }
    }

    /// Runs one inbound message through the relay in the background.
    pub fn dispatch(&self, message: InboundMessage) -> JoinHandle<RelayOutcome> {
        let relay = Arc::clone(&self.relay);
        tokio::spawn(async move { relay.handle(message, Utc::now()).await })
    }
}

//! Relay orchestrator for one inbound message.
//!
//! Each inbound message runs one cycle:
//! 1. Sweep idle sessions, record activity, append the user turn
//! 2. Ask the completion engine for a reply using the normalized snapshot
//! 3. Append the assistant turn on success, or pick a fallback reply
//! 4. Split the reply and hand the chunks to the messaging channel
//!
//! The session lock is only taken inside store calls, so a slow completion
//! never blocks other users.

use crate::config::RelayConfig;
use crate::fallback::fallback_reply;
use chatrelay_ai::{CompletionEngine, CompletionError, FailureKind};
use chatrelay_channel::{InboundMessage, MessagingChannel, split};
use chatrelay_conversation::{SessionStore, Turn};
use chatrelay_core::RelayId;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tracing::{Span, field, instrument};

/// Progress of one relay cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// The inbound message was accepted.
    Received,
    /// The user turn is in the session.
    HistoryUpdated,
    /// The completion engine was called.
    CompletionRequested,
    /// The engine produced a reply.
    CompletionOk,
    /// The engine failed; a fallback reply was chosen.
    CompletionFailed,
    /// The reply was handed to the messaging channel.
    Replied,
}

impl RelayState {
    /// Returns the snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::HistoryUpdated => "history_updated",
            Self::CompletionRequested => "completion_requested",
            Self::CompletionOk => "completion_ok",
            Self::CompletionFailed => "completion_failed",
            Self::Replied => "replied",
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Identifier of this cycle, for log correlation.
    pub relay_id: RelayId,
    /// Last state reached.
    pub state: RelayState,
    /// Reply text sent, or that would have been sent.
    pub reply: String,
    /// Failure kind, when the completion failed.
    pub failure: Option<FailureKind>,
    /// Number of chunks handed to the channel.
    pub chunks: usize,
    /// Whether the channel accepted every chunk.
    pub delivered: bool,
}

/// Coordinates the session store, completion engine and messaging channel.
pub struct RelayOrchestrator<E: CompletionEngine, C: MessagingChannel> {
    store: SessionStore,
    engine: E,
    channel: C,
    max_chunk_length: usize,
    completion_timeout: Duration,
}

impl<E: CompletionEngine, C: MessagingChannel> RelayOrchestrator<E, C> {
    /// Creates an orchestrator.
    pub fn new(store: SessionStore, engine: E, channel: C, config: &RelayConfig) -> Self {
        Self {
            store,
            engine,
            channel,
            max_chunk_length: config.max_chunk_length,
            completion_timeout: config.completion_timeout(),
        }
    }

    /// Overrides the completion timeout.
    #[must_use]
    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// The session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Runs one relay cycle for an inbound message.
    ///
    /// Never fails: completion errors turn into fallback replies and
    /// delivery errors are logged and reported through the outcome.
    #[instrument(
        skip(self, inbound, now),
        fields(relay_id = field::Empty, user_id = %inbound.user_id)
    )]
    pub async fn handle(&self, inbound: InboundMessage, now: DateTime<Utc>) -> RelayOutcome {
        let relay_id = RelayId::new();
        Span::current().record("relay_id", field::display(relay_id));
        let user_id = &inbound.user_id;

        let mut state = RelayState::Received;
        Self::enter(state);

        self.store.sweep(now);
        self.store.touch(user_id, now);
        let snapshot = self.store.append(user_id, Turn::user(inbound.text.as_str()));
        state = RelayState::HistoryUpdated;
        Self::enter(state);

        state = RelayState::CompletionRequested;
        Self::enter(state);
        let completion =
            tokio::time::timeout(self.completion_timeout, self.engine.complete(&snapshot))
                .await
                .unwrap_or(Err(CompletionError::Timeout))
                .and_then(|reply| {
                    if reply.trim().is_empty() {
                        Err(CompletionError::EmptyResponse)
                    } else {
                        Ok(reply)
                    }
                });

        let (reply, failure) = match completion {
            Ok(reply) => {
                self.store.append(user_id, Turn::assistant(reply.as_str()));
                state = RelayState::CompletionOk;
                (reply, None)
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(
                    error = %e,
                    kind = %kind,
                    model = self.engine.model(),
                    "completion failed, sending fallback reply"
                );
                state = RelayState::CompletionFailed;
                (fallback_reply(kind).to_string(), Some(kind))
            }
        };
        Self::enter(state);

        let chunks = split(&reply, self.max_chunk_length);
        let delivered = match self.channel.send_reply(&inbound.reply_target, &chunks).await {
            Ok(()) => true,
            Err(report) => {
                tracing::error!(
                    error = %report,
                    channel = self.channel.name(),
                    chunks = chunks.len(),
                    "failed to deliver reply"
                );
                false
            }
        };
        state = RelayState::Replied;
        Self::enter(state);

        RelayOutcome {
            relay_id,
            state,
            reply,
            failure,
            chunks: chunks.len(),
            delivered,
        }
    }

    fn enter(state: RelayState) {
        tracing::trace!(state = %state, "relay state");
    }
}

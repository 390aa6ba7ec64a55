//! In-memory conversation session store.
//!
//! The store maps each user to one bounded [`History`] and tracks when the
//! user was last active. All operations, including expiry sweeps, run under
//! a single mutex. The lock is never held across an `.await`: callers copy
//! the turns they need and release it before talking to the network.

use crate::expiry::ExpiryTracker;
use crate::history::{History, HistoryPolicy};
use crate::message::Turn;
use chatrelay_core::UserId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A snapshot of one user's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The user owning the session.
    pub user_id: UserId,
    /// Turns in chronological order, system turn first.
    pub turns: Vec<Turn>,
    /// Most recent inbound activity, if any has been recorded.
    pub last_activity: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns the number of turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

#[derive(Debug)]
struct StoreState {
    sessions: HashMap<UserId, History>,
    expiry: ExpiryTracker,
}

impl StoreState {
    fn snapshot(&self, user_id: &UserId) -> Option<Session> {
        self.sessions.get(user_id).map(|history| Session {
            user_id: user_id.clone(),
            turns: history.turns(),
            last_activity: self.expiry.last_activity(user_id),
        })
    }

    fn remove(&mut self, user_id: &UserId) -> bool {
        self.expiry.forget(user_id);
        self.sessions.remove(user_id).is_some()
    }
}

/// Per-user dialogue state shared by all request handlers.
///
/// Cloning the store yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    policy: Arc<HistoryPolicy>,
    state: Arc<Mutex<StoreState>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(policy: HistoryPolicy, expiration: Duration) -> Self {
        Self {
            policy: Arc::new(policy),
            state: Arc::new(Mutex::new(StoreState {
                sessions: HashMap::new(),
                expiry: ExpiryTracker::new(expiration),
            })),
        }
    }

    /// The history policy applied on every append.
    #[must_use]
    pub fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    /// The idle threshold after which sessions are swept.
    #[must_use]
    pub fn expiration(&self) -> Duration {
        self.lock().expiry.expiration()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the user's session, creating an empty one if absent.
    pub fn get_or_create(&self, user_id: &UserId) -> Session {
        let mut state = self.lock();
        if !state.sessions.contains_key(user_id) {
            tracing::debug!(user_id = %user_id, "creating conversation session");
            state.sessions.insert(user_id.clone(), History::new());
        }
        Session {
            user_id: user_id.clone(),
            turns: state.sessions[user_id].turns(),
            last_activity: state.expiry.last_activity(user_id),
        }
    }

    /// Appends a turn to the user's session and returns the normalized turns.
    ///
    /// The session is created if absent. Appending and normalization happen
    /// under one lock acquisition.
    pub fn append(&self, user_id: &UserId, turn: Turn) -> Vec<Turn> {
        let mut state = self.lock();
        let history = state.sessions.entry(user_id.clone()).or_default();
        let role = turn.role;
        let evicted = history.push(turn, &self.policy);
        tracing::trace!(
            user_id = %user_id,
            role = %role,
            evicted,
            turns = history.len(),
            "appended turn"
        );
        history.turns()
    }

    /// Deletes the user's session and activity record.
    ///
    /// Returns true if a session existed.
    pub fn remove(&self, user_id: &UserId) -> bool {
        self.lock().remove(user_id)
    }

    /// Records inbound activity for the user.
    pub fn touch(&self, user_id: &UserId, now: DateTime<Utc>) {
        self.lock().expiry.touch(user_id, now);
    }

    /// Removes every session idle for longer than the expiration threshold.
    ///
    /// A session that never had activity recorded has no idle time to
    /// measure and is removed as well.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.lock();
        let StoreState { sessions, expiry } = &mut *guard;

        let expired = expiry.drain_expired(now);
        let before = sessions.len();
        for user_id in &expired {
            sessions.remove(user_id);
        }
        sessions.retain(|user_id, _| expiry.last_activity(user_id).is_some());
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::debug!(
                expired_sessions = removed,
                remaining_sessions = sessions.len(),
                "swept idle sessions"
            );
        }
        removed
    }

    /// Returns a snapshot of the user's session without creating one.
    #[must_use]
    pub fn get(&self, user_id: &UserId) -> Option<Session> {
        self.lock().snapshot(user_id)
    }

    /// Returns the user's turns, or an empty list when there is no session.
    #[must_use]
    pub fn turns(&self, user_id: &UserId) -> Vec<Turn> {
        self.lock()
            .sessions
            .get(user_id)
            .map(History::turns)
            .unwrap_or_default()
    }

    /// Returns true if the user has a live session.
    #[must_use]
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.lock().sessions.contains_key(user_id)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Returns true if there are no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }
}

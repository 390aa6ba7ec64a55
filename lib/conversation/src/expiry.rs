//! Idle-session expiry.
//!
//! The tracker only records when each user was last active and answers
//! which users have been idle too long. It never reads the clock: callers
//! pass `now` explicitly.

use chatrelay_core::UserId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Last-activity bookkeeping for live sessions.
#[derive(Debug, Clone)]
pub struct ExpiryTracker {
    expiration: Duration,
    last_activity: HashMap<UserId, DateTime<Utc>>,
}

impl ExpiryTracker {
    /// Creates a tracker that expires users idle for longer than `expiration`.
    #[must_use]
    pub fn new(expiration: Duration) -> Self {
        Self {
            expiration,
            last_activity: HashMap::new(),
        }
    }

    /// The idle threshold.
    #[must_use]
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Records activity for a user.
    pub fn touch(&mut self, user_id: &UserId, now: DateTime<Utc>) {
        self.last_activity.insert(user_id.clone(), now);
    }

    /// Returns when the user was last active, if known.
    #[must_use]
    pub fn last_activity(&self, user_id: &UserId) -> Option<DateTime<Utc>> {
        self.last_activity.get(user_id).copied()
    }

    /// Returns true if the user's last activity is older than the threshold.
    #[must_use]
    pub fn is_expired(&self, user_id: &UserId, now: DateTime<Utc>) -> bool {
        self.last_activity
            .get(user_id)
            .is_some_and(|last| now - *last > self.expiration)
    }

    /// Removes and returns every user idle beyond the threshold.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<UserId> {
        let expired: Vec<UserId> = self
            .last_activity
            .iter()
            .filter(|(_, last)| now - **last > self.expiration)
            .map(|(user_id, _)| user_id.clone())
            .collect();

        for user_id in &expired {
            self.last_activity.remove(user_id);
        }
        expired
    }

    /// Forgets a user. No-op if the user is unknown.
    pub fn forget(&mut self, user_id: &UserId) {
        self.last_activity.remove(user_id);
    }

    /// Number of tracked users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last_activity.len()
    }

    /// Returns true if no user is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_activity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn touch_records_latest_activity() {
        let mut tracker = ExpiryTracker::new(Duration::seconds(7200));
        let user = UserId::new("alice");

        tracker.touch(&user, at(0));
        tracker.touch(&user, at(10));

        assert_eq!(tracker.last_activity(&user), Some(at(10)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let mut tracker = ExpiryTracker::new(Duration::seconds(7200));
        let user = UserId::new("alice");
        tracker.touch(&user, at(0));

        assert!(!tracker.is_expired(&user, at(7199)));
        assert!(!tracker.is_expired(&user, at(7200)));
        assert!(tracker.is_expired(&user, at(7201)));
    }

    #[test]
    fn drain_expired_only_removes_idle_users() {
        let mut tracker = ExpiryTracker::new(Duration::seconds(100));
        let idle = UserId::new("idle");
        let active = UserId::new("active");
        tracker.touch(&idle, at(0));
        tracker.touch(&active, at(50));

        let expired = tracker.drain_expired(at(120));

        assert_eq!(expired, vec![idle.clone()]);
        assert_eq!(tracker.last_activity(&idle), None);
        assert_eq!(tracker.last_activity(&active), Some(at(50)));
    }

    #[test]
    fn forget_is_idempotent() {
        let mut tracker = ExpiryTracker::new(Duration::seconds(100));
        let user = UserId::new("alice");
        tracker.touch(&user, at(0));

        tracker.forget(&user);
        tracker.forget(&user);

        assert!(tracker.is_empty());
    }
}

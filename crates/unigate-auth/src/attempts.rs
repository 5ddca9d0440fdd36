//! Failed-login-attempt tracking.
//!
//! Failures are counted per username. The count is only consulted at
//! successful-credential-check time, when the account service decides
//! whether to raise the lockout flag; failures themselves never flip
//! the flag directly.

use dashmap::DashMap;

pub trait LoginAttemptTracker: Send + Sync {
    /// Record one failed credential check for `username`.
    fn record_failure(&self, username: &str);
    /// Whether `username` has reached the allowed number of failures.
    fn has_exceeded_max_attempts(&self, username: &str) -> bool;
    /// Reset the counter for `username`.
    fn evict(&self, username: &str);
}

/// In-memory tracker backed by a concurrent map.
#[derive(Debug)]
pub struct InMemoryLoginAttemptTracker {
    attempts: DashMap<String, u32>,
    max_attempts: u32,
}

impl InMemoryLoginAttemptTracker {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
        }
    }
}

impl LoginAttemptTracker for InMemoryLoginAttemptTracker {
    fn record_failure(&self, username: &str) {
        *self.attempts.entry(username.to_string()).or_insert(0) += 1;
    }

    fn has_exceeded_max_attempts(&self, username: &str) -> bool {
        self.attempts
            .get(username)
            .map(|count| *count >= self.max_attempts)
            .unwrap_or(false)
    }

    fn evict(&self, username: &str) {
        self.attempts.remove(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_not_exceeded() {
        let tracker = InMemoryLoginAttemptTracker::new(3);
        tracker.record_failure("alice");
        tracker.record_failure("alice");
        assert!(!tracker.has_exceeded_max_attempts("alice"));
    }

    #[test]
    fn threshold_trips_the_tracker() {
        let tracker = InMemoryLoginAttemptTracker::new(3);
        for _ in 0..3 {
            tracker.record_failure("alice");
        }
        assert!(tracker.has_exceeded_max_attempts("alice"));
        // Other usernames are unaffected.
        assert!(!tracker.has_exceeded_max_attempts("bob"));
    }

    #[test]
    fn evict_resets_the_counter() {
        let tracker = InMemoryLoginAttemptTracker::new(2);
        tracker.record_failure("alice");
        tracker.record_failure("alice");
        assert!(tracker.has_exceeded_max_attempts("alice"));

        tracker.evict("alice");
        assert!(!tracker.has_exceeded_max_attempts("alice"));
    }

    #[test]
    fn unknown_username_is_not_exceeded() {
        let tracker = InMemoryLoginAttemptTracker::new(1);
        assert!(!tracker.has_exceeded_max_attempts("nobody"));
    }
}

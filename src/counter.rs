//! Per-session tally of consecutive failed authentication attempts.
//!
//! The counter is read by the password validator to decide when captcha
//! escalation kicks in; it is incremented by the gateway after a failed
//! attempt and removed on success or session invalidation.

use std::sync::Arc;

use tracing::debug;

use crate::context::SessionStore;

/// Failure counting capability.
///
/// `get` never fails: absent or unparseable values count as zero, so a
/// corrupted session attribute can never lock a user out of the flow.
pub trait FailureCounter: Send + Sync {
    fn get(&self, session_key: &str, attribute: &str) -> i64;
    fn increment(&self, session_key: &str, attribute: &str);
}

/// Counter backed by the gateway's [`SessionStore`].
#[derive(Clone)]
pub struct SessionFailureCounter {
    store: Arc<dyn SessionStore>,
}

impl SessionFailureCounter {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl FailureCounter for SessionFailureCounter {
    fn get(&self, session_key: &str, attribute: &str) -> i64 {
        self.store
            .get(session_key, attribute)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    fn increment(&self, session_key: &str, attribute: &str) {
        let next = self.get(session_key, attribute) + 1;
        debug!(session_key, attribute, count = next, "recording login failure");
        self.store.set(session_key, attribute, next.to_string());
    }
}

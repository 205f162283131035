//! Captcha verification capability used for failure escalation.

use std::sync::Arc;

use crate::context::{RequestContext, SessionStore};

pub const CAPTCHA_SESSION_ATTRIBUTE: &str = "auth_captcha_answer";

/// Validates a user-supplied captcha answer against session state.
///
/// `store` is called by whatever component renders the challenge; the
/// validator only ever calls `validate`.
pub trait CaptchaVerifier: Send + Sync {
    fn validate(&self, ctx: &RequestContext, answer: &str) -> bool;
    fn store(&self, ctx: &RequestContext, answer: &str);
}

/// Verifier that accepts every answer, for flows without a real challenge.
#[derive(Debug, Clone, Default)]
pub struct NoopCaptchaVerifier;

impl CaptchaVerifier for NoopCaptchaVerifier {
    fn validate(&self, _ctx: &RequestContext, _answer: &str) -> bool {
        true
    }

    fn store(&self, _ctx: &RequestContext, _answer: &str) {}
}

/// Verifier comparing the answer against the one stored in the session.
#[derive(Clone)]
pub struct SessionCaptchaVerifier {
    store: Arc<dyn SessionStore>,
    attribute: String,
}

impl SessionCaptchaVerifier {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            attribute: CAPTCHA_SESSION_ATTRIBUTE.to_string(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }
}

impl CaptchaVerifier for SessionCaptchaVerifier {
    fn validate(&self, ctx: &RequestContext, answer: &str) -> bool {
        self.store
            .get(ctx.session_key(), &self.attribute)
            .is_some_and(|expected| expected == answer.trim())
    }

    fn store(&self, ctx: &RequestContext, answer: &str) {
        self.store
            .set(ctx.session_key(), &self.attribute, answer.trim().to_string());
    }
}

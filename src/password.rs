//! Username/password validation with failure-count captcha escalation.
//!
//! Checks run in a fixed order and short-circuit at the first failure:
//! blank fields, the pluggable password rule, the exact-at-limit remind
//! state, then the captcha gate. The validator never increments the
//! failure counter itself; the gateway does that after a failed attempt,
//! so the count stays authoritative for "attempts since last success"
//! no matter which check rejected.

use std::sync::Arc;

use tracing::debug;

use crate::captcha::CaptchaVerifier;
use crate::context::RequestContext;
use crate::counter::FailureCounter;
use crate::error::AuthError;
use crate::profile::Profile;

pub const USERNAME_ATTRIBUTE: &str = "username";
pub const CAPTCHA_ATTRIBUTE: &str = "captcha";
pub const DEFAULT_RETRY_LIMIT: i64 = 3;
pub const DEFAULT_SESSION_KEY_ATTRIBUTE: &str = "auth_failure_count";

/// Domain-specific check between username and password.
///
/// Real deployments plug in their own credential store lookup here;
/// [`AllowAnyPassword`] leaves the decision entirely to later checks.
pub trait PasswordRule: Send + Sync {
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] when the pair is rejected.
    fn check(&self, username: &str, password: &str) -> Result<(), AuthError>;
}

/// Accepts every pair. Default rule.
#[derive(Debug, Clone, Default)]
pub struct AllowAnyPassword;

impl PasswordRule for AllowAnyPassword {
    fn check(&self, _username: &str, _password: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Demo rule for tests and examples: the pair passes only when username
/// and password are equal. Never use as a security default.
#[derive(Debug, Clone, Default)]
pub struct RequireMatchingPassword;

impl PasswordRule for RequireMatchingPassword {
    fn check(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username == password {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials(format!(
                "username '{username}' does not match password"
            )))
        }
    }
}

/// Tuning knobs for [`PasswordValidator`].
#[derive(Debug, Clone)]
pub struct PasswordValidatorConfig {
    /// Demand a captcha answer on every attempt, not only after failures.
    pub captcha_required: bool,
    /// Failure count at which escalation starts.
    pub retry_limit: i64,
    /// Session attribute the failure count is stored under.
    pub session_key_attribute: String,
}

impl Default for PasswordValidatorConfig {
    fn default() -> Self {
        Self {
            captcha_required: false,
            retry_limit: DEFAULT_RETRY_LIMIT,
            session_key_attribute: DEFAULT_SESSION_KEY_ATTRIBUTE.to_string(),
        }
    }
}

/// Validator for the username/password(+captcha) credential shape.
#[derive(Clone)]
pub struct PasswordValidator {
    config: PasswordValidatorConfig,
    rule: Arc<dyn PasswordRule>,
    captcha: Arc<dyn CaptchaVerifier>,
    counter: Arc<dyn FailureCounter>,
}

impl PasswordValidator {
    pub fn new(
        config: PasswordValidatorConfig,
        captcha: Arc<dyn CaptchaVerifier>,
        counter: Arc<dyn FailureCounter>,
    ) -> Self {
        Self {
            config,
            rule: Arc::new(AllowAnyPassword),
            captcha,
            counter,
        }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Arc<dyn PasswordRule>) -> Self {
        self.rule = rule;
        self
    }

    /// Run the full check sequence for one attempt.
    ///
    /// # Errors
    /// The first failing check wins; see [`AuthError`] for the taxonomy.
    pub fn validate(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
        captcha_answer: Option<&str>,
    ) -> Result<Profile, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "username cannot be blank".to_string(),
            ));
        }
        if password.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "password cannot be blank".to_string(),
            ));
        }

        self.rule.check(username, password)?;

        let failures = self
            .counter
            .get(ctx.session_key(), &self.config.session_key_attribute);
        debug!(username, failures, limit = self.config.retry_limit, "password validation");

        // Exactly at the limit: terminal remind state, the caller must
        // demand an explicit step-up before accepting further attempts.
        if failures == self.config.retry_limit {
            return Err(AuthError::OverRetryRemind);
        }

        if self.config.captcha_required || failures >= self.config.retry_limit {
            let answer = captcha_answer.unwrap_or_default();
            if answer.trim().is_empty() {
                return Err(AuthError::CaptchaMissing);
            }
            if !self.captcha.validate(ctx, answer) {
                return Err(AuthError::CaptchaIncorrect);
            }
        }

        let mut profile = Profile::new(username).with_attribute(USERNAME_ATTRIBUTE, username);
        if let Some(answer) = captcha_answer {
            profile.set_attribute(CAPTCHA_ATTRIBUTE, answer);
        }
        Ok(profile)
    }
}

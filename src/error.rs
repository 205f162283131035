//! Classified failure kinds returned by validators and resolvers.
//!
//! The gateway decides user-visible behavior (redirect, 401, captcha UI)
//! from the kind alone; the core never performs redirects or retries.

use thiserror::Error;

/// Every way a validation attempt can fail.
///
/// Remote transport problems are kept separate from deliberate credential
/// rejections so callers can tell "bad token" apart from "endpoint down".
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was supplied at all.
    #[error("no credentials provided")]
    MissingCredentials,

    /// A required field was blank or malformed.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The failure count sits exactly at the retry limit; the caller must
    /// demand an explicit step-up before another attempt is accepted.
    #[error("login failures reached the retry limit, step-up verification required")]
    OverRetryRemind,

    /// A captcha answer was required but not provided.
    #[error("captcha answer not provided")]
    CaptchaMissing,

    /// The provided captcha answer did not verify.
    #[error("captcha validation failed")]
    CaptchaIncorrect,

    /// The remote identity endpoint rejected the credential (401/403) or the
    /// delegated signature verification refused it.
    #[error("authentication rejected by the identity provider")]
    AuthenticationFailure,

    /// Transport failure, unexpected status, or unparseable response body.
    #[error("http communication error: {0}")]
    HttpCommunication(String),

    /// The request shape is not accepted by this component, e.g. a GET
    /// request hitting a POST-only extractor or a credential kind the
    /// orchestrator has no handler for.
    #[error("{0} not supported")]
    MethodNotSupported(String),
}

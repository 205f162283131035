//! Pluggable credential-validation core for authentication gateways.
//!
//! The crate accepts raw credentials (username/password, bearer token, or
//! payload+signature), decides whether a captcha challenge is required
//! based on the session's failure history, and resolves token/signature
//! credentials into a verified [`Profile`] — tokens via one signed call to
//! a remote identity endpoint, signatures via a local pluggable verifier.
//!
//! The gateway around this core owns HTTP serving, session storage and
//! user-visible behavior; it threads a [`RequestContext`] and a
//! [`SessionStore`] in and receives a [`VerifiedCredential`] or a
//! classified [`AuthError`] back.
//!
//! ```no_run
//! use std::sync::Arc;
//! use portcullis::{
//!     Credential, JsonProfileDefinition, MemorySessionStore, NoopCaptchaVerifier,
//!     Orchestrator, PasswordValidator, PasswordValidatorConfig, RequestContext,
//!     SessionFailureCounter, TokenResolver, TokenResolverConfig,
//! };
//!
//! # async fn run() -> Result<(), portcullis::AuthError> {
//! let store = Arc::new(MemorySessionStore::new());
//! let orchestrator = Orchestrator::new()
//!     .with_password_validator(PasswordValidator::new(
//!         PasswordValidatorConfig::default(),
//!         Arc::new(NoopCaptchaVerifier),
//!         Arc::new(SessionFailureCounter::new(store)),
//!     ))
//!     .with_token_resolver(TokenResolver::new(
//!         TokenResolverConfig::default(),
//!         Arc::new(JsonProfileDefinition::new("https://idp.example/profile")),
//!     ));
//!
//! let ctx = RequestContext::new("session-1");
//! let credential = Credential::username_password("bob", "secret", None)?;
//! let verified = orchestrator.authenticate(&ctx, Some(credential)).await?;
//! assert_eq!(verified.profile.id(), "bob");
//! # Ok(())
//! # }
//! ```

pub mod authorize;
pub mod captcha;
pub mod context;
pub mod counter;
pub mod credential;
pub mod error;
pub mod extract;
pub mod password;
pub mod profile;
pub mod resolver;
pub mod signature;
pub mod token;

mod orchestrator;

pub use authorize::{AuthorizationGenerator, UserDetails, UserDetailsAuthorizer, UserDetailsService};
pub use captcha::{CaptchaVerifier, NoopCaptchaVerifier, SessionCaptchaVerifier};
pub use context::{HttpMethod, MemorySessionStore, RequestContext, SessionStore};
pub use counter::{FailureCounter, SessionFailureCounter};
pub use credential::{Credential, VerifiedCredential};
pub use error::AuthError;
pub use extract::{FormCredentialsExtractor, SignatureParameterExtractor, TokenParameterExtractor};
pub use orchestrator::Orchestrator;
pub use password::{
    AllowAnyPassword, PasswordRule, PasswordValidator, PasswordValidatorConfig,
    RequireMatchingPassword,
};
pub use profile::Profile;
pub use resolver::{
    JsonProfileDefinition, NoopRequestSigner, ProfileDefinition, RequestSigner,
    SignedRequestSpec, TokenResolver, TokenResolverConfig,
};
pub use signature::{SignatureProfileDefinition, SignatureResolver};
pub use token::{AccessToken, RawSignature};

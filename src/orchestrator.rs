//! Top-level dispatch: route a credential to the right validator and
//! normalize the outcome.
//!
//! The orchestrator is the only entry point the surrounding gateway calls.
//! It is stateless across calls; all mutable state lives behind the
//! session store the failure counter reads.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::authorize::AuthorizationGenerator;
use crate::context::RequestContext;
use crate::credential::{Credential, VerifiedCredential};
use crate::error::AuthError;
use crate::password::PasswordValidator;
use crate::profile::Profile;
use crate::resolver::TokenResolver;
use crate::signature::SignatureResolver;

/// Dispatches credentials to the configured validators.
///
/// Only the handlers a gateway actually uses need to be configured;
/// dispatching a credential kind without a handler is
/// [`AuthError::MethodNotSupported`].
#[derive(Clone, Default)]
pub struct Orchestrator {
    password: Option<PasswordValidator>,
    token: Option<TokenResolver>,
    signature: Option<SignatureResolver>,
    authorizers: Vec<Arc<dyn AuthorizationGenerator>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_password_validator(mut self, validator: PasswordValidator) -> Self {
        self.password = Some(validator);
        self
    }

    #[must_use]
    pub fn with_token_resolver(mut self, resolver: TokenResolver) -> Self {
        self.token = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_signature_resolver(mut self, resolver: SignatureResolver) -> Self {
        self.signature = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Arc<dyn AuthorizationGenerator>) -> Self {
        self.authorizers.push(authorizer);
        self
    }

    /// Validate one credential and return it with its verified profile.
    ///
    /// The orchestrator never increments the failure counter; the gateway
    /// does that when this returns an error on the password path.
    ///
    /// # Errors
    /// [`AuthError::MissingCredentials`] when no credential was extracted;
    /// otherwise whatever the dispatched validator classified.
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        credential: Option<Credential>,
    ) -> Result<VerifiedCredential, AuthError> {
        let Some(credential) = credential else {
            return Err(AuthError::MissingCredentials);
        };

        let mut profile = self.dispatch(ctx, &credential).await?;
        self.decorate(ctx, &mut profile);
        debug!(id = profile.id(), "authentication succeeded");
        Ok(VerifiedCredential {
            credential,
            profile,
        })
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        credential: &Credential,
    ) -> Result<Profile, AuthError> {
        match credential {
            Credential::UsernamePassword {
                username,
                password,
                captcha,
            } => {
                let validator = self.password.as_ref().ok_or_else(|| {
                    AuthError::MethodNotSupported("password credentials".to_string())
                })?;
                validator.validate(ctx, username, password, captcha.as_deref())
            }
            Credential::Token(token) => {
                let resolver = self.token.as_ref().ok_or_else(|| {
                    AuthError::MethodNotSupported("token credentials".to_string())
                })?;
                resolver.resolve(ctx, token).await
            }
            Credential::Signature { payload, signature } => {
                let resolver = self.signature.as_ref().ok_or_else(|| {
                    AuthError::MethodNotSupported("signature credentials".to_string())
                })?;
                resolver.resolve(ctx, payload, signature)
            }
        }
    }

    /// Run authorization generators over a fresh profile. Decoration is
    /// enrichment only; a failing lookup leaves the profile undecorated
    /// rather than failing the authentication.
    fn decorate(&self, ctx: &RequestContext, profile: &mut Profile) {
        for authorizer in &self.authorizers {
            if let Err(err) = authorizer.generate(ctx, profile) {
                warn!(id = profile.id(), error = %err, "authorization decoration failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorize::{UserDetails, UserDetailsAuthorizer, UserDetailsService};
    use crate::captcha::NoopCaptchaVerifier;
    use crate::context::MemorySessionStore;
    use crate::counter::SessionFailureCounter;
    use crate::password::PasswordValidatorConfig;
    use crate::profile::Profile;
    use crate::signature::SignatureProfileDefinition;
    use anyhow::Result;

    fn password_orchestrator() -> Orchestrator {
        let store = Arc::new(MemorySessionStore::new());
        let validator = PasswordValidator::new(
            PasswordValidatorConfig::default(),
            Arc::new(NoopCaptchaVerifier),
            Arc::new(SessionFailureCounter::new(store)),
        );
        Orchestrator::new().with_password_validator(validator)
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let ctx = RequestContext::new("s1");
        let result = password_orchestrator().authenticate(&ctx, None).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn password_credential_dispatches_to_validator() -> Result<()> {
        let ctx = RequestContext::new("s1");
        let credential = Credential::username_password("bob", "secret", None)?;
        let verified = password_orchestrator()
            .authenticate(&ctx, Some(credential))
            .await?;
        assert_eq!(verified.profile.id(), "bob");
        Ok(())
    }

    #[tokio::test]
    async fn unconfigured_kind_is_not_supported() -> Result<()> {
        let ctx = RequestContext::new("s1");
        let credential = Credential::token("abc123")?;
        let result = password_orchestrator()
            .authenticate(&ctx, Some(credential))
            .await;
        assert!(matches!(result, Err(AuthError::MethodNotSupported(_))));
        Ok(())
    }

    struct ConstSignature;

    impl SignatureProfileDefinition for ConstSignature {
        fn extract_profile(&self, payload: &str, _signature: &str) -> Result<Profile> {
            Ok(Profile::new(payload))
        }
    }

    #[tokio::test]
    async fn signature_credential_dispatches_locally() -> Result<()> {
        let orchestrator = Orchestrator::new()
            .with_signature_resolver(SignatureResolver::new(Arc::new(ConstSignature)));
        let ctx = RequestContext::new("s1");
        let credential = Credential::signature("alice", "sig")?;
        let verified = orchestrator.authenticate(&ctx, Some(credential)).await?;
        assert_eq!(verified.profile.id(), "alice");
        Ok(())
    }

    struct OneRoleService;

    impl UserDetailsService for OneRoleService {
        fn load_by_id(&self, _id: &str) -> Result<Option<UserDetails>> {
            let mut details = UserDetails::default();
            details.roles.insert("user".to_string());
            Ok(Some(details))
        }
    }

    struct FailingService;

    impl UserDetailsService for FailingService {
        fn load_by_id(&self, _id: &str) -> Result<Option<UserDetails>> {
            anyhow::bail!("details store unreachable")
        }
    }

    #[tokio::test]
    async fn authorizers_decorate_the_profile() -> Result<()> {
        let orchestrator = password_orchestrator()
            .with_authorizer(Arc::new(UserDetailsAuthorizer::new(Arc::new(OneRoleService))));
        let ctx = RequestContext::new("s1");
        let credential = Credential::username_password("bob", "secret", None)?;
        let verified = orchestrator.authenticate(&ctx, Some(credential)).await?;
        assert!(verified.profile.has_role("user"));
        Ok(())
    }

    #[tokio::test]
    async fn failing_authorizer_does_not_fail_authentication() -> Result<()> {
        let orchestrator = password_orchestrator()
            .with_authorizer(Arc::new(UserDetailsAuthorizer::new(Arc::new(FailingService))));
        let ctx = RequestContext::new("s1");
        let credential = Credential::username_password("bob", "secret", None)?;
        let verified = orchestrator.authenticate(&ctx, Some(credential)).await?;
        assert!(verified.profile.roles().is_empty());
        Ok(())
    }
}

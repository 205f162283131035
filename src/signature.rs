//! Signed-payload resolution: same shape as token resolution but local.
//!
//! The `(payload, signature)` pair never leaves the process; the pluggable
//! definition does its own cryptographic verification and either yields a
//! profile or rejects the pair.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::AuthError;
use crate::profile::Profile;

/// Verification and extraction for signed payloads.
///
/// Implementations own the signature math (HMAC, Ed25519, whatever the
/// provider uses) and return the verified profile on success.
pub trait SignatureProfileDefinition: Send + Sync {
    /// # Errors
    /// Fails when the signature does not verify or the payload cannot be
    /// decoded into a profile.
    fn extract_profile(&self, payload: &str, signature: &str) -> Result<Profile>;
}

/// Resolver for the `(payload, signature)` credential shape.
#[derive(Clone)]
pub struct SignatureResolver {
    definition: Arc<dyn SignatureProfileDefinition>,
}

impl SignatureResolver {
    pub fn new(definition: Arc<dyn SignatureProfileDefinition>) -> Self {
        Self { definition }
    }

    /// Verify one payload/signature pair.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for a blank payload;
    /// [`AuthError::AuthenticationFailure`] when the definition rejects
    /// the pair.
    pub fn resolve(
        &self,
        _ctx: &RequestContext,
        payload: &str,
        signature: &str,
    ) -> Result<Profile, AuthError> {
        if payload.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "payload cannot be blank".to_string(),
            ));
        }

        match self.definition.extract_profile(payload, signature) {
            Ok(profile) => {
                debug!(id = profile.id(), "signature verified");
                Ok(profile)
            }
            Err(err) => {
                debug!(error = %err, "signature verification rejected the payload");
                Err(AuthError::AuthenticationFailure)
            }
        }
    }
}

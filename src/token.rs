//! Opaque provider token and signature wrappers.
//!
//! Providers hand back an opaque raw string; some encode `key=value` pairs
//! separated by `&` inside it, which [`AccessToken::parameter`] exposes
//! without committing to any provider-specific schema.

use crate::error::AuthError;

/// Bearer token as received from the provider, plus the `key=value`
/// accessor over its raw form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessToken {
    raw: Option<String>,
}

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// The raw provider string.
    ///
    /// # Errors
    /// Fails when the token was constructed without a raw value.
    pub fn raw(&self) -> Result<&str, AuthError> {
        self.raw.as_deref().ok_or_else(|| {
            AuthError::InvalidCredentials("access token has no raw value".to_string())
        })
    }

    /// Look up a `key=value` pair in the `&`-delimited raw string.
    ///
    /// The first matching key wins; a pair without a value yields `None`.
    pub fn parameter(&self, name: &str) -> Option<String> {
        parse_parameter(self.raw.as_deref()?, name)
    }
}

/// Raw signature material from the provider, same accessor contract as
/// [`AccessToken`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSignature {
    raw: Option<String>,
}

impl RawSignature {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// The raw provider string.
    ///
    /// # Errors
    /// Fails when the signature was constructed without a raw value.
    pub fn raw(&self) -> Result<&str, AuthError> {
        self.raw.as_deref().ok_or_else(|| {
            AuthError::InvalidCredentials("signature has no raw value".to_string())
        })
    }

    pub fn parameter(&self, name: &str) -> Option<String> {
        parse_parameter(self.raw.as_deref()?, name)
    }
}

fn parse_parameter(raw: &str, name: &str) -> Option<String> {
    for pair in raw.split('&') {
        let Some(rest) = pair.strip_prefix(name) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        // First key match wins, even when it carries no value.
        return rest
            .split('=')
            .next()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
    }
    None
}

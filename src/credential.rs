//! Credential variants: one validation attempt's raw identity proof.

use crate::error::AuthError;
use crate::profile::Profile;
use crate::token::AccessToken;

/// Raw input for one validation attempt.
///
/// Constructors enforce the variant's required fields, so a credential in
/// hand is always fully populated; the validators still re-check blankness
/// for credentials built elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    UsernamePassword {
        username: String,
        password: String,
        captcha: Option<String>,
    },
    Token(AccessToken),
    Signature {
        payload: String,
        signature: String,
    },
}

impl Credential {
    /// # Errors
    /// [`AuthError::InvalidCredentials`] when username or password is blank.
    pub fn username_password(
        username: impl Into<String>,
        password: impl Into<String>,
        captcha: Option<String>,
    ) -> Result<Self, AuthError> {
        let username = username.into();
        let password = password.into();
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
        Ok(Self::UsernamePassword {
            username,
            password,
            captcha,
        })
    }

    /// # Errors
    /// [`AuthError::InvalidCredentials`] when the token is blank.
    pub fn token(raw: impl Into<String>) -> Result<Self, AuthError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "token cannot be blank".to_string(),
            ));
        }
        Ok(Self::Token(AccessToken::new(raw)))
    }

    /// # Errors
    /// [`AuthError::InvalidCredentials`] when the payload is blank.
    pub fn signature(
        payload: impl Into<String>,
        signature: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let payload = payload.into();
        if payload.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "payload cannot be blank".to_string(),
            ));
        }
        Ok(Self::Signature {
            payload,
            signature: signature.into(),
        })
    }
}

/// A credential together with the profile its validation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCredential {
    pub credential: Credential,
    pub profile: Profile,
}

//! Credential extraction from the inbound request snapshot.
//!
//! Extractors pull the raw fields out of parameters, headers or a JSON
//! body and hand back a [`Credential`] or `None`; they gate on the HTTP
//! verb but never blank-check field values, which stays the validators'
//! job.

use serde::Deserialize;
use tracing::debug;

use crate::context::{HttpMethod, RequestContext};
use crate::credential::Credential;
use crate::error::AuthError;

/// Pulls a bearer token from a request parameter, falling back to a
/// header of the same name.
#[derive(Debug, Clone)]
pub struct TokenParameterExtractor {
    parameter_name: String,
    support_get: bool,
    support_post: bool,
}

impl TokenParameterExtractor {
    pub fn new(parameter_name: impl Into<String>) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            support_get: true,
            support_post: false,
        }
    }

    #[must_use]
    pub const fn with_methods(mut self, support_get: bool, support_post: bool) -> Self {
        self.support_get = support_get;
        self.support_post = support_post;
        self
    }

    /// # Errors
    /// [`AuthError::MethodNotSupported`] for a verb this extractor was not
    /// configured for.
    pub fn extract(&self, ctx: &RequestContext) -> Result<Option<Credential>, AuthError> {
        check_method(ctx, self.support_get, self.support_post)?;

        let value = ctx
            .parameter(&self.parameter_name)
            .or_else(|| ctx.header(&self.parameter_name));
        let Some(value) = value else {
            debug!(parameter = %self.parameter_name, "no token in request");
            return Ok(None);
        };
        Credential::token(value).map(Some)
    }
}

/// Pulls a `(payload, signature)` pair from two request parameters.
#[derive(Debug, Clone)]
pub struct SignatureParameterExtractor {
    payload_parameter: String,
    signature_parameter: String,
    support_get: bool,
    support_post: bool,
}

impl SignatureParameterExtractor {
    pub fn new(
        payload_parameter: impl Into<String>,
        signature_parameter: impl Into<String>,
    ) -> Self {
        Self {
            payload_parameter: payload_parameter.into(),
            signature_parameter: signature_parameter.into(),
            support_get: true,
            support_post: true,
        }
    }

    #[must_use]
    pub const fn with_methods(mut self, support_get: bool, support_post: bool) -> Self {
        self.support_get = support_get;
        self.support_post = support_post;
        self
    }

    /// # Errors
    /// [`AuthError::MethodNotSupported`] for an unsupported verb.
    pub fn extract(&self, ctx: &RequestContext) -> Result<Option<Credential>, AuthError> {
        check_method(ctx, self.support_get, self.support_post)?;

        let payload = ctx
            .parameter(&self.payload_parameter)
            .or_else(|| ctx.header(&self.payload_parameter));
        let signature = ctx
            .parameter(&self.signature_parameter)
            .or_else(|| ctx.header(&self.signature_parameter));
        match (payload, signature) {
            (Some(payload), Some(signature)) => Credential::signature(payload, signature).map(Some),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: Option<String>,
    password: Option<String>,
    captcha: Option<String>,
}

/// Pulls username/password/captcha from form parameters, or from a JSON
/// body when the request declares one.
#[derive(Debug, Clone)]
pub struct FormCredentialsExtractor {
    username_parameter: String,
    password_parameter: String,
    captcha_parameter: String,
    post_only: bool,
}

impl Default for FormCredentialsExtractor {
    fn default() -> Self {
        Self {
            username_parameter: "username".to_string(),
            password_parameter: "password".to_string(),
            captcha_parameter: "captcha".to_string(),
            post_only: true,
        }
    }
}

impl FormCredentialsExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parameters(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        captcha: impl Into<String>,
    ) -> Self {
        self.username_parameter = username.into();
        self.password_parameter = password.into();
        self.captcha_parameter = captcha.into();
        self
    }

    #[must_use]
    pub const fn with_post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    /// # Errors
    /// [`AuthError::MethodNotSupported`] when configured post-only and the
    /// request is a GET; [`AuthError::HttpCommunication`] for an
    /// undecodable JSON body.
    pub fn extract(&self, ctx: &RequestContext) -> Result<Option<Credential>, AuthError> {
        if self.post_only && ctx.method() != HttpMethod::Post {
            return Err(AuthError::MethodNotSupported(format!(
                "{} requests",
                ctx.method()
            )));
        }

        if ctx.method() == HttpMethod::Post && ctx.is_json() {
            return self.extract_from_json(ctx);
        }

        let username = ctx.parameter(&self.username_parameter);
        let password = ctx.parameter(&self.password_parameter);
        let (Some(username), Some(password)) = (username, password) else {
            return Ok(None);
        };
        let captcha = ctx.parameter(&self.captcha_parameter).map(str::to_string);
        Credential::username_password(username, password, captcha).map(Some)
    }

    fn extract_from_json(&self, ctx: &RequestContext) -> Result<Option<Credential>, AuthError> {
        let Some(body) = ctx.body() else {
            return Ok(None);
        };
        let login: LoginBody = serde_json::from_str(body).map_err(|err| {
            AuthError::HttpCommunication(format!("undecodable login body: {err}"))
        })?;
        let (Some(username), Some(password)) = (login.username, login.password) else {
            return Ok(None);
        };
        Credential::username_password(username, password, login.captcha).map(Some)
    }
}

fn check_method(
    ctx: &RequestContext,
    support_get: bool,
    support_post: bool,
) -> Result<(), AuthError> {
    let supported = match ctx.method() {
        HttpMethod::Get => support_get,
        HttpMethod::Post => support_post,
    };
    if supported {
        Ok(())
    } else {
        Err(AuthError::MethodNotSupported(format!(
            "{} requests",
            ctx.method()
        )))
    }
}

//! Token resolution: exchange an opaque bearer token for a verified
//! profile by calling a remote identity endpoint.
//!
//! The protocol is sign -> call -> parse -> map. Providers plug in a
//! [`ProfileDefinition`] (where to call, how to read the body) and
//! optionally a [`RequestSigner`] (extra headers/cookies, redirect policy,
//! timeouts). The resolver itself issues exactly one outbound call per
//! attempt and never retries.

pub mod request;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{redirect, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::context::{HttpMethod, RequestContext};
use crate::error::AuthError;
use crate::profile::Profile;
use crate::token::AccessToken;

pub use request::{
    SignedRequestSpec, DEFAULT_ACCEPT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONTENT_TYPE,
    DEFAULT_READ_TIMEOUT,
};

pub const DEFAULT_TOKEN_PARAMETER: &str = "token";

/// Where the profile endpoint lives and how to read what it returns.
///
/// `profile_url` may derive the URL from data embedded in the token.
pub trait ProfileDefinition: Send + Sync {
    /// # Errors
    /// Fails when no URL can be computed for this token.
    fn profile_url(&self, ctx: &RequestContext, token: &AccessToken) -> Result<String>;

    /// # Errors
    /// Fails when the body cannot be decoded into a profile.
    fn extract_profile(&self, body: &str) -> Result<Profile>;
}

/// Provider hook run after defaults are merged and before the call goes
/// out. The default implementation changes nothing.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, ctx: &RequestContext, token: &AccessToken, spec: &mut SignedRequestSpec);
}

/// Signer that leaves the request untouched.
#[derive(Debug, Clone, Default)]
pub struct NoopRequestSigner;

impl RequestSigner for NoopRequestSigner {
    fn sign(&self, _ctx: &RequestContext, _token: &AccessToken, _spec: &mut SignedRequestSpec) {}
}

/// Profile definition for JSON endpoints: fixed URL, profile id read from
/// a configurable attribute, every top-level field kept as an attribute.
#[derive(Debug, Clone)]
pub struct JsonProfileDefinition {
    profile_url: String,
    id_attribute: String,
}

impl JsonProfileDefinition {
    pub fn new(profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into(),
            id_attribute: "id".to_string(),
        }
    }

    #[must_use]
    pub fn with_id_attribute(mut self, id_attribute: impl Into<String>) -> Self {
        self.id_attribute = id_attribute.into();
        self
    }
}

impl ProfileDefinition for JsonProfileDefinition {
    fn profile_url(&self, _ctx: &RequestContext, _token: &AccessToken) -> Result<String> {
        Ok(self.profile_url.clone())
    }

    fn extract_profile(&self, body: &str) -> Result<Profile> {
        let fields: Map<String, Value> =
            serde_json::from_str(body).context("profile body is not a JSON object")?;
        let id = match fields.get(&self.id_attribute) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => bail!("profile body has no '{}' attribute", self.id_attribute),
        };
        let mut profile = Profile::new(id);
        for (name, value) in fields {
            profile.set_attribute(name, value);
        }
        Ok(profile)
    }
}

/// Tuning knobs for [`TokenResolver`].
#[derive(Debug, Clone)]
pub struct TokenResolverConfig {
    /// Parameter name the token is sent under.
    pub parameter_name: String,
    /// Percent-encode custom parameter values before sending. The token
    /// itself is never re-encoded.
    pub encode_params: bool,
    /// Verb for the outbound call: GET puts parameters in the query
    /// string, POST sends a url-encoded form body.
    pub method: HttpMethod,
    /// Caller-supplied headers; always win over computed defaults.
    pub custom_headers: HashMap<String, String>,
    /// Caller-supplied parameters sent alongside the token.
    pub custom_params: HashMap<String, String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TokenResolverConfig {
    fn default() -> Self {
        Self {
            parameter_name: DEFAULT_TOKEN_PARAMETER.to_string(),
            encode_params: true,
            method: HttpMethod::Get,
            custom_headers: HashMap::new(),
            custom_params: HashMap::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Resolves bearer tokens into profiles via one outbound HTTP call.
#[derive(Clone)]
pub struct TokenResolver {
    config: TokenResolverConfig,
    definition: Arc<dyn ProfileDefinition>,
    signer: Arc<dyn RequestSigner>,
}

impl TokenResolver {
    pub fn new(config: TokenResolverConfig, definition: Arc<dyn ProfileDefinition>) -> Self {
        Self {
            config,
            definition,
            signer: Arc::new(NoopRequestSigner),
        }
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Resolve one token into a profile.
    ///
    /// # Errors
    /// [`AuthError::MissingCredentials`] for a blank token,
    /// [`AuthError::AuthenticationFailure`] on a remote 401/403, and
    /// [`AuthError::HttpCommunication`] for transport errors, unexpected
    /// statuses, empty bodies and unparseable profiles.
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        token: &AccessToken,
    ) -> Result<Profile, AuthError> {
        let raw = token.raw()?;
        if raw.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let profile_url = self
            .definition
            .profile_url(ctx, token)
            .map_err(|err| AuthError::HttpCommunication(format!("no profile url: {err}")))?;
        debug!(url = %profile_url, "resolving token against profile endpoint");

        let mut spec = self.build_spec(ctx, raw, &profile_url);
        self.signer.sign(ctx, token, &mut spec);

        let body = fetch_profile_body(&spec).await?;
        let profile = self
            .definition
            .extract_profile(&body)
            .map_err(|err| AuthError::HttpCommunication(format!("invalid profile body: {err}")))?;
        debug!(id = profile.id(), "token resolved to profile");
        Ok(profile)
    }

    /// Merge custom headers/params with computed defaults. Caller values
    /// always take precedence; the token is injected last, unencoded.
    fn build_spec(&self, ctx: &RequestContext, raw_token: &str, url: &str) -> SignedRequestSpec {
        let mut spec = SignedRequestSpec::new(url, self.config.method);
        spec.connect_timeout = self.config.connect_timeout;
        spec.read_timeout = self.config.read_timeout;
        spec.headers = self.config.custom_headers.clone();

        for (name, value) in &self.config.custom_params {
            let value = if self.config.encode_params {
                request::encode_param(value)
            } else {
                value.clone()
            };
            spec.set_param(name.clone(), value);
        }
        spec.set_param(self.config.parameter_name.clone(), raw_token);

        spec.set_header_if_absent("Content-Type", DEFAULT_CONTENT_TYPE);
        spec.set_header_if_absent(
            "Accept",
            ctx.header("accept").unwrap_or(DEFAULT_ACCEPT),
        );
        spec.set_header_if_absent(
            "User-Agent",
            ctx.header("user-agent").unwrap_or(request::APP_USER_AGENT),
        );
        spec
    }
}

/// Issue the single outbound call and map the outcome by status.
///
/// The response is consumed or dropped on every path, releasing the
/// connection back to the pool.
async fn fetch_profile_body(spec: &SignedRequestSpec) -> Result<String, AuthError> {
    let policy = if spec.follow_redirects {
        redirect::Policy::limited(10)
    } else {
        redirect::Policy::none()
    };
    let client = reqwest::Client::builder()
        .connect_timeout(spec.connect_timeout)
        .timeout(spec.read_timeout)
        .redirect(policy)
        .build()
        .map_err(|err| AuthError::HttpCommunication(format!("client setup failed: {err}")))?;

    let mut request = match spec.method {
        HttpMethod::Get => client.get(spec.query_url()),
        HttpMethod::Post => client.post(&spec.url).body(spec.form_body()),
    };
    for (name, value) in &spec.headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request
        .send()
        .await
        .map_err(|err| AuthError::HttpCommunication(format!("request failed: {err}")))?;

    let status = response.status();
    match status {
        StatusCode::OK => {
            let body = response
                .text()
                .await
                .map_err(|err| AuthError::HttpCommunication(format!("body read failed: {err}")))?;
            if body.trim().is_empty() {
                return Err(AuthError::HttpCommunication(
                    "empty body from profile endpoint".to_string(),
                ));
            }
            Ok(body)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            debug!(%status, url = %spec.url, "profile endpoint rejected the token");
            Err(AuthError::AuthenticationFailure)
        }
        _ => {
            warn!(%status, url = %spec.url, "unexpected status from profile endpoint");
            Err(AuthError::HttpCommunication(format!(
                "unexpected status {status} from profile endpoint"
            )))
        }
    }
}

//! Per-call description of the outbound profile request.
//!
//! A spec is built fresh for every resolution attempt, handed to the
//! [`RequestSigner`](super::RequestSigner) for provider-specific mutation,
//! then turned into exactly one HTTP call.

use std::collections::HashMap;
use std::time::Duration;

use url::form_urlencoded;

use crate::context::HttpMethod;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub(crate) static APP_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Ephemeral outbound request description: URL, verb, headers, parameters
/// and timeouts. Discarded after the call completes.
#[derive(Debug, Clone)]
pub struct SignedRequestSpec {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub follow_redirects: bool,
}

impl SignedRequestSpec {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: HashMap::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            follow_redirects: false,
        }
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Set a header only when no caller-supplied value exists; header names
    /// compare case-insensitively.
    pub fn set_header_if_absent(&mut self, name: &str, value: impl Into<String>) {
        if !self.has_header(name) {
            self.headers.insert(name.to_string(), value.into());
        }
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|key| key.eq_ignore_ascii_case(name))
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Final URL for a GET call: parameters appended to the query string
    /// as-is (values are expected to be pre-encoded when encoding is on).
    #[must_use]
    pub fn query_url(&self) -> String {
        let mut url = self.url.clone();
        for (name, value) in &self.params {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(name);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    /// Form body for a POST call, same pre-encoded-value convention as
    /// [`Self::query_url`].
    #[must_use]
    pub fn form_body(&self) -> String {
        let mut body = String::new();
        for (name, value) in &self.params {
            if !body.is_empty() {
                body.push('&');
            }
            body.push_str(name);
            body.push('=');
            body.push_str(value);
        }
        body
    }
}

/// Percent-encode a parameter value the way a form submission would.
pub(crate) fn encode_param(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

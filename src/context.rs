//! Inbound request snapshot and the session storage capability.
//!
//! The surrounding gateway owns the real HTTP request and session machinery;
//! the core only sees this read-only snapshot plus a get/set contract for
//! session attributes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// HTTP verb of the inbound request, as far as the core cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Read-only view of one inbound request: verb, parameters, headers, body
/// and the session key the attempt is scoped to.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: HttpMethod,
    session_key: String,
    parameters: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Option<String>,
}

impl RequestContext {
    pub fn new(session_key: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            session_key: session_key.into(),
            parameters: HashMap::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Header lookup is case-insensitive, matching HTTP semantics.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// True when the request declares a JSON body.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|value| value.contains("application/json"))
    }
}

/// Session attribute storage owned by the gateway.
///
/// The core never owns session state; the failure counter and the
/// session-backed captcha verifier go through this contract only.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_key: &str, attribute: &str) -> Option<String>;
    fn set(&self, session_key: &str, attribute: &str, value: String);
    fn remove(&self, session_key: &str, attribute: &str);
}

/// In-memory store for tests and single-process gateways.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_key: &str, attribute: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(&(session_key.to_string(), attribute.to_string()))
            .cloned()
    }

    fn set(&self, session_key: &str, attribute: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((session_key.to_string(), attribute.to_string()), value);
        }
    }

    fn remove(&self, session_key: &str, attribute: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&(session_key.to_string(), attribute.to_string()));
        }
    }
}

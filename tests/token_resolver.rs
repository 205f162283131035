//! End-to-end token resolution against a local identity endpoint.
//!
//! Each test spins up an axum server on an ephemeral port and drives the
//! resolver through the real reqwest path: status mapping, header
//! defaults, signing hook, GET/POST bodies and idempotence.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use portcullis::{
    AccessToken, AuthError, HttpMethod, JsonProfileDefinition, Profile, RequestContext,
    RequestSigner, SignedRequestSpec, TokenResolver, TokenResolverConfig,
};

async fn spawn(app: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn resolver_for(base: &str) -> TokenResolver {
    TokenResolver::new(
        TokenResolverConfig::default(),
        Arc::new(JsonProfileDefinition::new(format!("{base}/profile"))),
    )
}

#[tokio::test]
async fn ok_body_resolves_to_profile() -> Result<()> {
    let app = Router::new().route(
        "/profile",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            if params.get("token").map(String::as_str) == Some("abc123") {
                (StatusCode::OK, r#"{"id":"u1"}"#).into_response()
            } else {
                (StatusCode::BAD_REQUEST, "wrong token").into_response()
            }
        }),
    );
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let profile = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await?;
    assert_eq!(profile.id(), "u1");
    Ok(())
}

#[tokio::test]
async fn forbidden_is_authentication_failure() -> Result<()> {
    let app = Router::new().route("/profile", get(|| async { StatusCode::FORBIDDEN }));
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let result = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await;
    assert!(matches!(result, Err(AuthError::AuthenticationFailure)));
    Ok(())
}

#[tokio::test]
async fn unauthorized_is_authentication_failure() -> Result<()> {
    let app = Router::new().route("/profile", get(|| async { StatusCode::UNAUTHORIZED }));
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let result = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await;
    assert!(matches!(result, Err(AuthError::AuthenticationFailure)));
    Ok(())
}

#[tokio::test]
async fn server_error_is_a_communication_error() -> Result<()> {
    let app = Router::new().route("/profile", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let result = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await;
    assert!(matches!(result, Err(AuthError::HttpCommunication(_))));
    Ok(())
}

#[tokio::test]
async fn empty_ok_body_is_a_communication_error() -> Result<()> {
    let app = Router::new().route("/profile", get(|| async { (StatusCode::OK, "") }));
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let result = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await;
    assert!(matches!(result, Err(AuthError::HttpCommunication(_))));
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_a_communication_error() -> Result<()> {
    // Bind then drop the listener so nothing is listening on the port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let ctx = RequestContext::new("s1");
    let result = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await;
    assert!(matches!(result, Err(AuthError::HttpCommunication(_))));
    Ok(())
}

#[tokio::test]
async fn identical_bodies_yield_equal_profiles() -> Result<()> {
    let app = Router::new().route(
        "/profile",
        get(|| async { (StatusCode::OK, r#"{"id":"u1","email":"u1@example.com"}"#) }),
    );
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let resolver = resolver_for(&base);
    let first = resolver.resolve(&ctx, &AccessToken::new("abc123")).await?;
    let second = resolver.resolve(&ctx, &AccessToken::new("abc123")).await?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn default_headers_reach_the_endpoint() -> Result<()> {
    let app = Router::new().route(
        "/profile",
        get(|headers: HeaderMap| async move {
            let accept = headers
                .get("accept")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            let user_agent = headers
                .get("user-agent")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            if accept == "application/json, text/plain, */*"
                && user_agent == concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
            {
                (StatusCode::OK, r#"{"id":"u1"}"#)
            } else {
                (StatusCode::BAD_REQUEST, "unexpected headers")
            }
        }),
    );
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let profile = resolver_for(&base)
        .resolve(&ctx, &AccessToken::new("abc123"))
        .await?;
    assert_eq!(profile.id(), "u1");
    Ok(())
}

struct HeaderSigner;

impl RequestSigner for HeaderSigner {
    fn sign(&self, _ctx: &RequestContext, token: &AccessToken, spec: &mut SignedRequestSpec) {
        if let Ok(raw) = token.raw() {
            spec.set_header("X-Provider-Token", raw.to_string());
        }
    }
}

#[tokio::test]
async fn signer_can_add_provider_headers() -> Result<()> {
    let app = Router::new().route(
        "/profile",
        get(|headers: HeaderMap| async move {
            if headers.get("X-Provider-Token").is_some() {
                (StatusCode::OK, r#"{"id":"u1"}"#)
            } else {
                (StatusCode::UNAUTHORIZED, "")
            }
        }),
    );
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let resolver = TokenResolver::new(
        TokenResolverConfig::default(),
        Arc::new(JsonProfileDefinition::new(format!("{base}/profile"))),
    )
    .with_signer(Arc::new(HeaderSigner));
    let profile = resolver.resolve(&ctx, &AccessToken::new("abc123")).await?;
    assert_eq!(profile.id(), "u1");
    Ok(())
}

#[tokio::test]
async fn post_sends_a_form_body() -> Result<()> {
    let app = Router::new().route(
        "/profile",
        post(|headers: HeaderMap, body: String| async move {
            let form = headers
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.contains("application/x-www-form-urlencoded"));
            if form && body.split('&').any(|pair| pair == "token=abc123") {
                (StatusCode::OK, r#"{"id":"u1"}"#)
            } else {
                (StatusCode::BAD_REQUEST, "unexpected body")
            }
        }),
    );
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let config = TokenResolverConfig {
        method: HttpMethod::Post,
        ..TokenResolverConfig::default()
    };
    let resolver = TokenResolver::new(
        config,
        Arc::new(JsonProfileDefinition::new(format!("{base}/profile"))),
    );
    let profile = resolver.resolve(&ctx, &AccessToken::new("abc123")).await?;
    assert_eq!(profile.id(), "u1");
    Ok(())
}

/// Definition that reads the endpoint out of the token itself.
struct TokenEmbeddedUrl;

impl portcullis::ProfileDefinition for TokenEmbeddedUrl {
    fn profile_url(&self, _ctx: &RequestContext, token: &AccessToken) -> anyhow::Result<String> {
        token
            .parameter("endpoint")
            .ok_or_else(|| anyhow::anyhow!("token carries no endpoint"))
    }

    fn extract_profile(&self, body: &str) -> anyhow::Result<Profile> {
        Ok(Profile::new(body.trim()))
    }
}

#[tokio::test]
async fn profile_url_can_come_from_the_token() -> Result<()> {
    let app = Router::new().route("/profile", get(|| async { (StatusCode::OK, "u7") }));
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let resolver = TokenResolver::new(TokenResolverConfig::default(), Arc::new(TokenEmbeddedUrl));
    let token = AccessToken::new(format!("endpoint={base}/profile&kind=embedded"));
    let profile = resolver.resolve(&ctx, &token).await?;
    assert_eq!(profile.id(), "u7");
    Ok(())
}

#[tokio::test]
async fn custom_params_travel_encoded() -> Result<()> {
    let app = Router::new().route(
        "/profile",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            // axum decodes the query, so the pre-encoded value arrives restored.
            if params.get("scope").map(String::as_str) == Some("read write") {
                (StatusCode::OK, r#"{"id":"u1"}"#)
            } else {
                (StatusCode::BAD_REQUEST, "missing scope")
            }
        }),
    );
    let base = spawn(app).await?;

    let ctx = RequestContext::new("s1");
    let mut config = TokenResolverConfig::default();
    config
        .custom_params
        .insert("scope".to_string(), "read write".to_string());
    let resolver = TokenResolver::new(
        config,
        Arc::new(JsonProfileDefinition::new(format!("{base}/profile"))),
    );
    let profile = resolver.resolve(&ctx, &AccessToken::new("abc123")).await?;
    assert_eq!(profile.id(), "u1");
    Ok(())
}

// ABOUTME: HTTP-level tests for the bridge router driven through tower oneshot requests
// ABOUTME: Covers authorize redirects, the token endpoint, JWKS, discovery, and health
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::{exchange_with, CountingKeyStore, MockProvider, CLIENT_ID, ISSUER};
use discord_oidc_bridge::routes::{build_router, BridgeContext};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;

const REDIRECT_URI: &str = "https://team.example.com/cdn-cgi/access/callback";

fn router(provider: MockProvider) -> Router {
    let exchange = exchange_with(Arc::new(provider), Arc::new(CountingKeyStore::seeded()), &[]);
    build_router(Arc::new(BridgeContext {
        exchange,
        client_id: CLIENT_ID.to_owned(),
        redirect_uri: REDIRECT_URI.to_owned(),
        authorize_url: "https://discord.com/oauth2/authorize".to_owned(),
        issuer: ISSUER.to_owned(),
    }))
}

fn authorize_path(scope_mode: &str, client_id: &str, redirect_uri: &str) -> String {
    let mut url = Url::parse(&format!("http://bridge/authorize/{scope_mode}")).unwrap();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", "opaque-state");
    format!("{}?{}", url.path(), url.query().unwrap())
}

async fn get(router: Router, uri: &str) -> Result<(StatusCode, Vec<u8>, Option<String>)> {
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::HOST, "bridge.example.com")
                .body(Body::empty())?,
        )
        .await?;
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_owned());
    let body = to_bytes(response.into_body(), usize::MAX).await?.to_vec();
    Ok((status, body, location))
}

async fn post_token(router: Router, form: &str) -> Result<(StatusCode, Value)> {
    let response = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_owned()))?,
        )
        .await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

#[tokio::test]
async fn test_authorize_redirects_to_discord() -> Result<()> {
    let (status, _, location) = get(
        router(MockProvider::verified()),
        &authorize_path("guilds", CLIENT_ID, REDIRECT_URI),
    )
    .await?;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let location = Url::parse(&location.expect("redirect location"))?;
    assert_eq!(location.host_str(), Some("discord.com"));
    assert_eq!(location.path(), "/oauth2/authorize");

    let pairs: Vec<(String, String)> = location.query_pairs().into_owned().collect();
    let find = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    assert_eq!(find("client_id"), Some(CLIENT_ID));
    assert_eq!(find("redirect_uri"), Some(REDIRECT_URI));
    assert_eq!(find("response_type"), Some("code"));
    assert_eq!(find("scope"), Some("identify email guilds"));
    assert_eq!(find("prompt"), Some("none"));
    assert_eq!(find("state"), Some("opaque-state"));
    Ok(())
}

#[tokio::test]
async fn test_authorize_email_mode_omits_guilds_scope() -> Result<()> {
    let (status, _, location) = get(
        router(MockProvider::verified()),
        &authorize_path("email", CLIENT_ID, REDIRECT_URI),
    )
    .await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location.unwrap().contains("scope=identify+email&"));
    Ok(())
}

#[tokio::test]
async fn test_authorize_rejects_unknown_client_and_redirect() -> Result<()> {
    let (status, _, _) = get(
        router(MockProvider::verified()),
        &authorize_path("email", "someone-else", REDIRECT_URI),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(
        router(MockProvider::verified()),
        &authorize_path("email", CLIENT_ID, "https://evil.example.com/callback"),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = get(
        router(MockProvider::verified()),
        &authorize_path("everything", CLIENT_ID, REDIRECT_URI),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["error"], "INVALID_INPUT");
    Ok(())
}

#[tokio::test]
async fn test_token_endpoint_returns_oauth_fields_and_id_token() -> Result<()> {
    let (status, body) = post_token(
        router(MockProvider::verified()),
        "grant_type=authorization_code&code=bar",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "xxxx");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 604_800);
    assert_eq!(body["refresh_token"], "yyyy");
    assert_eq!(body["scope"], "identify email");
    assert_eq!(body["id_token"].as_str().unwrap().split('.').count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_token_endpoint_maps_exchange_errors() -> Result<()> {
    let (status, body) = post_token(router(MockProvider::new(None)), "code=bar").await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access_denied");
    assert!(body["error_description"]
        .as_str()
        .unwrap()
        .starts_with("NOT_VERIFIED"));

    let (status, body) = post_token(
        router(MockProvider::verified().failing_exchange()),
        "code=bar",
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");

    let (status, body) = post_token(
        router(MockProvider::verified().failing_user()),
        "code=bar",
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error_description"]
        .as_str()
        .unwrap()
        .starts_with("UPSTREAM_FAILURE"));
    Ok(())
}

#[tokio::test]
async fn test_token_endpoint_requires_code() -> Result<()> {
    let (status, body) = post_token(router(MockProvider::verified()), "grant_type=authorization_code").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_REQUIRED_FIELD");
    Ok(())
}

#[tokio::test]
async fn test_jwks_served_at_both_locations() -> Result<()> {
    for uri in ["/jwks.json", "/.well-known/jwks.json"] {
        let (status, body, _) = get(router(MockProvider::verified()), uri).await?;
        assert_eq!(status, StatusCode::OK);
        let jwks: Value = serde_json::from_slice(&body)?;
        assert_eq!(jwks["keys"][0]["kid"], "jwtRS256");
        assert_eq!(jwks["keys"][0]["alg"], "RS256");
        assert!(jwks["keys"][0].get("d").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_discovery_document_uses_request_host() -> Result<()> {
    let (status, body, _) = get(
        router(MockProvider::verified()),
        "/.well-known/openid-configuration",
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let metadata: Value = serde_json::from_slice(&body)?;
    assert_eq!(metadata["issuer"], ISSUER);
    assert_eq!(metadata["token_endpoint"], "https://bridge.example.com/token");
    assert_eq!(metadata["jwks_uri"], "https://bridge.example.com/jwks.json");
    assert_eq!(metadata["id_token_signing_alg_values_supported"][0], "RS256");
    Ok(())
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (status, body, _) = get(router(MockProvider::verified()), "/health").await?;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body)?;
    assert_eq!(health["status"], "healthy");
    Ok(())
}

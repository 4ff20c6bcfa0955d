// ABOUTME: OpenID Connect discovery document for relying parties
// ABOUTME: Endpoint URLs are derived from the request host so the bridge can sit behind any domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::BridgeContext;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::get,
    Json, Router,
};
use oidc_bridge_core::constants::jwt;
use oidc_bridge_core::errors::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;

/// `OpenID` provider metadata, the subset the bridge supports
#[derive(Debug, Serialize)]
pub struct ProviderMetadata {
    /// Issuer of identity tokens
    pub issuer: String,
    /// Authorization redirect endpoint
    pub authorization_endpoint: String,
    /// Token exchange endpoint
    pub token_endpoint: String,
    /// Verification key set
    pub jwks_uri: String,
    /// Supported response types
    pub response_types_supported: Vec<&'static str>,
    /// Supported subject identifier types
    pub subject_types_supported: Vec<&'static str>,
    /// Identity token signing algorithms
    pub id_token_signing_alg_values_supported: Vec<&'static str>,
    /// Supported scopes
    pub scopes_supported: Vec<&'static str>,
    /// Client authentication methods at the token endpoint
    pub token_endpoint_auth_methods_supported: Vec<&'static str>,
}

impl ProviderMetadata {
    /// Build metadata for a public base URL (scheme and authority, no trailing slash)
    #[must_use]
    pub fn for_base_url(issuer: &str, base_url: &str) -> Self {
        Self {
            issuer: issuer.to_owned(),
            authorization_endpoint: format!("{base_url}/authorize/email"),
            token_endpoint: format!("{base_url}/token"),
            jwks_uri: format!("{base_url}/jwks.json"),
            response_types_supported: vec!["code"],
            subject_types_supported: vec!["public"],
            id_token_signing_alg_values_supported: vec![jwt::ALGORITHM],
            scopes_supported: vec!["openid", "identify", "email", "guilds"],
            token_endpoint_auth_methods_supported: vec!["client_secret_post"],
        }
    }
}

/// Discovery routes implementation
pub struct DiscoveryRoutes;

impl DiscoveryRoutes {
    /// Create the discovery route
    pub fn routes(context: Arc<BridgeContext>) -> Router {
        Router::new()
            .route(
                "/.well-known/openid-configuration",
                get(Self::handle_configuration),
            )
            .with_state(context)
    }

    async fn handle_configuration(
        State(context): State<Arc<BridgeContext>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ProviderMetadata>> {
        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::invalid_input("Host header is required"))?;
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("https");

        Ok(Json(ProviderMetadata::for_base_url(
            &context.issuer,
            &format!("{scheme}://{host}"),
        )))
    }
}

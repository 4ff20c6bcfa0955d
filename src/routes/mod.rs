// ABOUTME: HTTP route definitions and router assembly for the bridge
// ABOUTME: Authorization redirect, token exchange, JWKS, discovery, and health endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! HTTP routes
//!
//! Each endpoint group exposes a `routes()` constructor; [`build_router`]
//! merges them over a shared [`BridgeContext`] and adds request tracing.

/// Browser authorization redirect
pub mod authorize;
/// `OpenID` provider metadata
pub mod discovery;
/// Liveness endpoint
pub mod health;
/// Published verification keys
pub mod jwks;
/// Authorization code to token exchange
pub mod token;

use crate::config::ServerConfig;
use crate::exchange::TokenExchange;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use authorize::AuthorizeRoutes;
pub use discovery::DiscoveryRoutes;
pub use health::HealthRoutes;
pub use jwks::JwksRoutes;
pub use token::TokenRoutes;

/// State shared by all handlers
#[derive(Clone)]
pub struct BridgeContext {
    /// Token exchange, also the owner of the key lifecycle
    pub exchange: TokenExchange,
    /// OAuth client id accepted by the authorize endpoint
    pub client_id: String,
    /// Redirect URI accepted by the authorize endpoint
    pub redirect_uri: String,
    /// Discord authorization page
    pub authorize_url: String,
    /// `iss` of issued tokens, advertised in discovery
    pub issuer: String,
}

impl BridgeContext {
    /// Build the handler context from configuration and a ready exchange
    #[must_use]
    pub fn new(config: &ServerConfig, exchange: TokenExchange) -> Self {
        Self {
            exchange,
            client_id: config.discord.client_id.clone(),
            redirect_uri: config.discord.redirect_uri.clone(),
            authorize_url: config.discord.authorize_url.clone(),
            issuer: config.token.issuer.clone(),
        }
    }
}

/// Assemble the complete router
pub fn build_router(context: Arc<BridgeContext>) -> Router {
    Router::new()
        .merge(AuthorizeRoutes::routes(Arc::clone(&context)))
        .merge(TokenRoutes::routes(Arc::clone(&context)))
        .merge(JwksRoutes::routes(Arc::clone(&context)))
        .merge(DiscoveryRoutes::routes(context))
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
}

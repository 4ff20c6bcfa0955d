// ABOUTME: JWKS endpoints publishing the identity token verification key
// ABOUTME: Served at /jwks.json and the well-known location
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::BridgeContext;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use oidc_bridge_core::errors::AppResult;
use std::sync::Arc;

/// JWKS routes implementation
pub struct JwksRoutes;

impl JwksRoutes {
    /// Create the JWKS routes
    pub fn routes(context: Arc<BridgeContext>) -> Router {
        Router::new()
            .route("/jwks.json", get(Self::handle_jwks))
            .route("/.well-known/jwks.json", get(Self::handle_jwks))
            .with_state(context)
    }

    async fn handle_jwks(
        State(context): State<Arc<BridgeContext>>,
    ) -> AppResult<impl IntoResponse> {
        let jwks = context.exchange.keys().jwks().await?;
        Ok((
            [(header::CACHE_CONTROL, "public, max-age=300")],
            Json(jwks),
        ))
    }
}

// ABOUTME: Token endpoint exchanging a Discord authorization code for OAuth and identity tokens
// ABOUTME: Returns the provider token fields plus the signed id_token, or an OAuth-style error body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::BridgeContext;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use oidc_bridge_core::constants::discord;
use oidc_bridge_core::errors::AppError;
use oidc_bridge_core::models::OAuthToken;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Form body of `POST /token`; other standard fields are accepted and ignored
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    code: Option<String>,
}

/// Successful token endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Provider token fields
    #[serde(flatten)]
    pub oauth_token: OAuthToken,
    /// Signed identity token
    pub id_token: String,
}

/// Token routes implementation
pub struct TokenRoutes;

impl TokenRoutes {
    /// Create the token exchange route
    pub fn routes(context: Arc<BridgeContext>) -> Router {
        Router::new()
            .route("/token", post(Self::handle_token))
            .with_state(context)
    }

    async fn handle_token(
        State(context): State<Arc<BridgeContext>>,
        Form(request): Form<TokenRequest>,
    ) -> Response {
        let Some(code) = request.code.filter(|code| !code.is_empty()) else {
            return AppError::missing_field("code").into_response();
        };

        match context.exchange.exchange(&code).await {
            Ok(outcome) => {
                let mut oauth_token = outcome.oauth_token;
                oauth_token.scope = discord::TOKEN_SCOPE.to_owned();
                Json(TokenResponse {
                    oauth_token,
                    id_token: outcome.jwt,
                })
                .into_response()
            }
            Err(error) => error.into_response(),
        }
    }
}

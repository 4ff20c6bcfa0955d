// ABOUTME: Authorization redirect endpoint in front of the Discord consent page
// ABOUTME: Validates the relying party's client id, redirect URI, and scope mode before redirecting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::BridgeContext;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use oidc_bridge_core::constants::discord;
use oidc_bridge_core::errors::{AppError, AppResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Query parameters of `GET /authorize/:scope_mode`
#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    client_id: Option<String>,
    redirect_uri: Option<String>,
    state: Option<String>,
}

/// Requested Discord scope set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// Identity and email only
    Email,
    /// Identity, email, and guild memberships
    Guilds,
}

impl ScopeMode {
    /// Parse the path segment
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "email" => Some(Self::Email),
            "guilds" => Some(Self::Guilds),
            _ => None,
        }
    }

    /// Discord scope string
    #[must_use]
    pub const fn scope(self) -> &'static str {
        match self {
            Self::Email => discord::TOKEN_SCOPE,
            Self::Guilds => discord::GUILDS_SCOPE,
        }
    }
}

/// Authorization routes implementation
pub struct AuthorizeRoutes;

impl AuthorizeRoutes {
    /// Create the authorization redirect route
    pub fn routes(context: Arc<BridgeContext>) -> Router {
        Router::new()
            .route("/authorize/:scope_mode", get(Self::handle_authorize))
            .with_state(context)
    }

    async fn handle_authorize(
        State(context): State<Arc<BridgeContext>>,
        Path(scope_mode): Path<String>,
        Query(query): Query<AuthorizeQuery>,
    ) -> AppResult<Redirect> {
        if query.client_id.as_deref() != Some(context.client_id.as_str()) {
            warn!("Authorization request with unknown client_id");
            return Err(AppError::invalid_input("Unknown client_id"));
        }
        if query.redirect_uri.as_deref() != Some(context.redirect_uri.as_str()) {
            warn!("Authorization request with unregistered redirect_uri");
            return Err(AppError::invalid_input("Unregistered redirect_uri"));
        }
        let mode = ScopeMode::parse(&scope_mode).ok_or_else(|| {
            AppError::invalid_input(format!("Unsupported scope mode: {scope_mode}"))
        })?;

        let location = Self::discord_authorize_url(&context, mode, query.state.as_deref())?;
        debug!(scope = mode.scope(), "Redirecting to Discord authorization");
        Ok(Redirect::to(location.as_str()))
    }

    /// Build the Discord consent URL for a scope mode
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorize URL does not parse
    pub fn discord_authorize_url(
        context: &BridgeContext,
        mode: ScopeMode,
        state: Option<&str>,
    ) -> AppResult<Url> {
        let mut url = Url::parse(&context.authorize_url)
            .map_err(|e| AppError::config_invalid(format!("Invalid authorize URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &context.client_id)
                .append_pair("redirect_uri", &context.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", mode.scope())
                .append_pair("prompt", "none");
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
        }

        Ok(url)
    }
}

// ABOUTME: Typed failure of one token exchange, normalized from every collaborator error
// ABOUTME: Each variant maps to a stable kind code and the HTTP status the token endpoint returns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::identity::ProviderError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oidc_bridge_core::errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Stable classification of exchange failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenErrorKind {
    /// The provider rejected or failed the code exchange
    TokenGenFailure,
    /// The user's profile is not verified
    NotVerified,
    /// A profile, guild, or role lookup failed after the code exchange
    UpstreamFailure,
    /// The signing key could not be obtained or the token could not be signed
    SigningFailure,
}

impl TokenErrorKind {
    /// Kind code as it appears in logs and error bodies
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenGenFailure => "TOKEN_GEN_FAILURE",
            Self::NotVerified => "NOT_VERIFIED",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
            Self::SigningFailure => "SIGNING_FAILURE",
        }
    }

    /// HTTP status for the token endpoint
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::TokenGenFailure => 400,
            Self::NotVerified => 403,
            Self::UpstreamFailure => 502,
            Self::SigningFailure => 500,
        }
    }

    /// OAuth 2.0 error code for the token endpoint response
    #[must_use]
    pub const fn oauth_error(self) -> &'static str {
        match self {
            Self::TokenGenFailure => "invalid_grant",
            Self::NotVerified => "access_denied",
            Self::UpstreamFailure => "temporarily_unavailable",
            Self::SigningFailure => "server_error",
        }
    }
}

/// Failure of a token exchange
#[derive(Debug, Error)]
pub enum TokenError {
    /// Code exchange failed
    #[error("authorization code exchange failed: {0}")]
    TokenGeneration(#[source] ProviderError),

    /// Verification gate rejected the identity
    #[error("user {user_id} has not verified their account")]
    NotVerified {
        /// Provider user id
        user_id: String,
    },

    /// Identity or role lookup failed
    #[error("identity lookup failed: {0}")]
    Upstream(#[source] ProviderError),

    /// Key lifecycle or JWS encoding failed
    #[error("identity token signing failed: {0}")]
    Signing(#[source] AppError),
}

impl TokenError {
    /// Classification of this failure
    #[must_use]
    pub const fn kind(&self) -> TokenErrorKind {
        match self {
            Self::TokenGeneration(_) => TokenErrorKind::TokenGenFailure,
            Self::NotVerified { .. } => TokenErrorKind::NotVerified,
            Self::Upstream(_) => TokenErrorKind::UpstreamFailure,
            Self::Signing(_) => TokenErrorKind::SigningFailure,
        }
    }

    /// Description safe to return to the caller
    ///
    /// Signing failures are reported without internal detail.
    #[must_use]
    pub fn public_description(&self) -> String {
        match self {
            Self::Signing(_) => format!("{}: unable to issue identity token", self.kind().as_str()),
            other => format!("{}: {other}", other.kind().as_str()),
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status =
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(kind = kind.as_str(), error = %self, "Token exchange failed");
        } else {
            tracing::warn!(kind = kind.as_str(), error = %self, "Token exchange rejected");
        }
        let body = json!({
            "error": kind.oauth_error(),
            "error_description": self.public_description(),
        });
        (status, Json(body)).into_response()
    }
}

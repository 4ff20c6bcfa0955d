// ABOUTME: Identity provider contract consumed by the token exchange
// ABOUTME: Code exchange, profile, guild, and role lookups with a structured error type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Identity Provider Contract
//!
//! The exchange depends on exactly four provider operations. Transport,
//! authentication headers and retries are the implementor's concern; the
//! exchange only sees the results and a [`ProviderError`] on failure.

use async_trait::async_trait;
use oidc_bridge_core::models::{Identity, OAuthToken, UserProfile};
use thiserror::Error;

/// Failure reported by an identity provider operation
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response
    #[error("{provider} request to {endpoint} failed: {source}")]
    Http {
        /// Provider name
        provider: &'static str,
        /// Endpoint path that was called
        endpoint: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status
    #[error("{provider} returned {status} for {endpoint}: {body}")]
    Status {
        /// Provider name
        provider: &'static str,
        /// Endpoint path that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("{provider} returned an unexpected payload from {endpoint}: {message}")]
    InvalidResponse {
        /// Provider name
        provider: &'static str,
        /// Endpoint path that was called
        endpoint: String,
        /// Decoding error description
        message: String,
    },

    /// The operation needs a credential that was not configured
    #[error("{provider} is missing configuration: {message}")]
    NotConfigured {
        /// Provider name
        provider: &'static str,
        /// What is missing
        message: String,
    },
}

impl ProviderError {
    /// HTTP status returned by the provider, when there was one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations the token exchange needs from the OAuth identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logs and errors
    fn name(&self) -> &'static str;

    /// Exchange a single-use authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, ProviderError>;

    /// Fetch the authenticated user's profile
    async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, ProviderError>;

    /// Fetch the ids of every guild the authenticated user has joined
    async fn fetch_guilds(&self, access_token: &str) -> Result<Vec<String>, ProviderError>;

    /// Fetch the user's role ids within one guild
    async fn fetch_roles(&self, guild_id: &str, user_id: &str)
        -> Result<Vec<String>, ProviderError>;

    /// Fetch the profile together with guild memberships
    async fn fetch_profile(&self, access_token: &str) -> Result<Identity, ProviderError> {
        let (profile, guilds) = tokio::try_join!(
            self.fetch_user(access_token),
            self.fetch_guilds(access_token)
        )?;
        Ok(Identity::from_profile(profile, guilds))
    }
}

// ABOUTME: Token exchange orchestration from authorization code to signed identity token
// ABOUTME: Sequences provider calls, the verification gate, role lookups, claim composition, and signing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Token Exchange
//!
//! One exchange runs these steps in order, each gated on the previous one:
//!
//! 1. exchange the authorization code for an OAuth token
//! 2. fetch the profile and joined guilds
//! 3. reject identities that are not verified, before the key store is touched
//! 4. fetch roles for every configured guild the user has joined
//! 5. obtain the signing key, compose the claims, sign
//!
//! The caller receives either both the OAuth token and the identity token, or
//! exactly one [`TokenError`].

use super::claims::{ClaimsComposer, RoleClaims};
use super::errors::TokenError;
use crate::identity::{IdentityProvider, ProviderError};
use crate::keys::KeyLifecycleManager;
use chrono::Utc;
use futures_util::future::try_join_all;
use oidc_bridge_core::models::{Identity, OAuthToken};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings for issued identity tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSettings {
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim, the OAuth client id
    pub audience: String,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Guilds whose role memberships become claims
    pub role_guild_ids: Vec<String>,
}

/// Successful exchange result
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    /// Provider token, unmodified
    pub oauth_token: OAuthToken,
    /// Compact RS256 identity token
    pub jwt: String,
}

/// Exchanges authorization codes for signed identity tokens
#[derive(Clone)]
pub struct TokenExchange {
    provider: Arc<dyn IdentityProvider>,
    keys: KeyLifecycleManager,
    composer: ClaimsComposer,
    role_guild_ids: Vec<String>,
}

impl TokenExchange {
    /// Create an exchange over injected collaborators
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        keys: KeyLifecycleManager,
        settings: ExchangeSettings,
    ) -> Self {
        let mut role_guild_ids = settings.role_guild_ids;
        role_guild_ids.sort();
        role_guild_ids.dedup();

        Self {
            provider,
            keys,
            composer: ClaimsComposer::new(
                settings.issuer,
                settings.audience,
                settings.token_ttl_secs,
            ),
            role_guild_ids,
        }
    }

    /// Key lifecycle manager shared with the JWKS endpoint
    #[must_use]
    pub const fn keys(&self) -> &KeyLifecycleManager {
        &self.keys
    }

    /// Run one exchange for an authorization code
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] classifying the first step that failed
    pub async fn exchange(&self, code: &str) -> Result<ExchangeOutcome, TokenError> {
        let provider = self.provider.name();

        let oauth_token = self
            .provider
            .exchange_code(code)
            .await
            .map_err(TokenError::TokenGeneration)?;
        debug!(provider, "Authorization code exchanged");

        let identity = self
            .provider
            .fetch_profile(&oauth_token.access_token)
            .await
            .map_err(TokenError::Upstream)?;

        if !identity.is_verified() {
            warn!(provider, user_id = %identity.id, "Rejecting unverified identity");
            return Err(TokenError::NotVerified {
                user_id: identity.id,
            });
        }

        let roles = self.role_claims(&identity).await?;

        let signing_key = self
            .keys
            .get_or_create_signing_key()
            .await
            .map_err(TokenError::Signing)?;

        let user_id = identity.id.clone();
        let claims = self
            .composer
            .compose(identity, roles, Utc::now().timestamp());
        let jwt = signing_key.sign(&claims).map_err(TokenError::Signing)?;

        info!(
            provider,
            user_id = %user_id,
            role_guilds = claims.roles.len(),
            "Issued identity token"
        );
        Ok(ExchangeOutcome { oauth_token, jwt })
    }

    /// Fetch roles for configured guilds the user has joined, concurrently
    async fn role_claims(&self, identity: &Identity) -> Result<RoleClaims, TokenError> {
        let lookups = self
            .role_guild_ids
            .iter()
            .filter(|guild_id| identity.has_joined(guild_id))
            .map(|guild_id| async move {
                let roles = self.provider.fetch_roles(guild_id, &identity.id).await?;
                Ok::<_, ProviderError>((guild_id.clone(), roles))
            });

        let fetched = try_join_all(lookups).await.map_err(TokenError::Upstream)?;
        Ok(fetched.into_iter().collect())
    }
}

// ABOUTME: Discord REST implementation of the identity provider contract
// ABOUTME: Code exchange, current-user profile, guild list, and bot-authenticated guild member roles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::provider::{IdentityProvider, ProviderError};
use crate::config::DiscordConfig;
use crate::utils::http_client::oauth_client;
use async_trait::async_trait;
use oidc_bridge_core::constants::discord;
use oidc_bridge_core::models::{OAuthToken, UserProfile};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const PROVIDER_NAME: &str = "discord";

/// Guild entry from `GET /users/@me/guilds`; only the id is used
#[derive(Debug, Deserialize)]
struct PartialGuild {
    id: String,
}

/// Guild member entry from `GET /guilds/{guild}/members/{user}`
#[derive(Debug, Deserialize)]
struct GuildMember {
    #[serde(default)]
    roles: Vec<String>,
}

/// Discord identity provider
#[derive(Clone)]
pub struct DiscordProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    bot_token: Option<String>,
    api_base: String,
}

impl DiscordProvider {
    /// Create a provider with the default OAuth HTTP client
    #[must_use]
    pub fn new(config: &DiscordConfig) -> Self {
        Self::with_client(oauth_client(), config)
    }

    /// Create a provider over a caller-supplied HTTP client
    #[must_use]
    pub fn with_client(client: Client, config: &DiscordConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            bot_token: config.bot_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.api_base)
    }

    /// Send a request and decode a 2xx JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = request.send().await.map_err(|source| ProviderError::Http {
            provider: PROVIDER_NAME,
            endpoint: endpoint.to_owned(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                provider = PROVIDER_NAME,
                endpoint,
                status = status.as_u16(),
                "Discord request rejected"
            );
            return Err(ProviderError::Status {
                provider: PROVIDER_NAME,
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER_NAME,
                endpoint: endpoint.to_owned(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl IdentityProvider for DiscordProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, ProviderError> {
        let endpoint = "/oauth2/token";
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("scope", discord::TOKEN_SCOPE),
        ];

        debug!(provider = PROVIDER_NAME, "Exchanging authorization code");
        self.send_json(endpoint, self.client.post(self.url(endpoint)).form(&params))
            .await
    }

    async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, ProviderError> {
        let endpoint = "/users/@me";
        self.send_json(
            endpoint,
            self.client.get(self.url(endpoint)).bearer_auth(access_token),
        )
        .await
    }

    async fn fetch_guilds(&self, access_token: &str) -> Result<Vec<String>, ProviderError> {
        let endpoint = "/users/@me/guilds";
        let guilds: Vec<PartialGuild> = self
            .send_json(
                endpoint,
                self.client.get(self.url(endpoint)).bearer_auth(access_token),
            )
            .await?;
        Ok(guilds.into_iter().map(|guild| guild.id).collect())
    }

    async fn fetch_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let bot_token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured {
                provider: PROVIDER_NAME,
                message: "a bot token is required to read guild member roles".to_owned(),
            })?;

        let endpoint = format!("/guilds/{guild_id}/members/{user_id}");
        let member: GuildMember = self
            .send_json(
                &endpoint,
                self.client
                    .get(self.url(&endpoint))
                    .header(AUTHORIZATION, format!("Bot {bot_token}")),
            )
            .await?;
        debug!(guild_id, roles = member.roles.len(), "Fetched guild member roles");
        Ok(member.roles)
    }
}

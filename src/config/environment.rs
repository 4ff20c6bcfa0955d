// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses Discord credentials, token settings, and key storage location from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management for production deployment

use crate::exchange::ExchangeSettings;
use oidc_bridge_core::constants::{discord, jwt};
use oidc_bridge_core::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;
use url::Url;

/// Default HTTP listen port
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Discord application credentials and endpoints
///
/// Secrets are passed through opaquely and redacted from `Debug` output.
#[derive(Clone)]
pub struct DiscordConfig {
    /// OAuth client id, also the `aud` of issued tokens
    pub client_id: String,
    /// OAuth client secret for the code exchange
    pub client_secret: String,
    /// Redirect URI registered with Discord
    pub redirect_uri: String,
    /// Bot credential for guild member lookups
    pub bot_token: Option<String>,
    /// REST API root
    pub api_base: String,
    /// Browser authorization page
    pub authorize_url: String,
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("authorize_url", &self.authorize_url)
            .finish()
    }
}

/// Identity token settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// `iss` claim
    pub issuer: String,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
    /// Guilds whose role memberships become claims
    pub role_guild_ids: Vec<String>,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Discord application settings
    pub discord: DiscordConfig,
    /// Identity token settings
    pub token: TokenConfig,
    /// Key file location; `None` keeps the key in memory only
    pub key_store_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| AppError::config_missing(key));

        let http_port = match var("HTTP_PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| AppError::config_invalid(format!("Invalid HTTP_PORT '{port}': {e}")))?,
            None => DEFAULT_HTTP_PORT,
        };

        let discord = DiscordConfig {
            client_id: required("DISCORD_CLIENT_ID")?,
            client_secret: required("DISCORD_CLIENT_SECRET")?,
            redirect_uri: required("DISCORD_REDIRECT_URI")?,
            bot_token: var("DISCORD_BOT_TOKEN"),
            api_base: var("DISCORD_API_BASE")
                .unwrap_or_else(|| discord::API_BASE.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            authorize_url: var("DISCORD_AUTHORIZE_URL")
                .unwrap_or_else(|| discord::AUTHORIZE_URL.to_owned()),
        };

        let ttl_secs = match var("ID_TOKEN_TTL_SECS") {
            Some(ttl) => ttl.parse().map_err(|e| {
                AppError::config_invalid(format!("Invalid ID_TOKEN_TTL_SECS '{ttl}': {e}"))
            })?,
            None => jwt::DEFAULT_TOKEN_TTL_SECS,
        };

        let token = TokenConfig {
            issuer: var("TOKEN_ISSUER").unwrap_or_else(|| jwt::DEFAULT_ISSUER.to_owned()),
            ttl_secs,
            role_guild_ids: var("ROLE_GUILD_IDS")
                .map(|ids| parse_list(&ids))
                .unwrap_or_default(),
        };

        let mut config = Self {
            http_port,
            discord,
            token,
            key_store_path: var("KEY_STORE_PATH").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values and drop settings that cannot take effect
    ///
    /// # Errors
    /// Returns an error if a URL is malformed or the token lifetime is zero
    pub fn validate(&mut self) -> AppResult<()> {
        for (name, value) in [
            ("DISCORD_REDIRECT_URI", &self.discord.redirect_uri),
            ("DISCORD_API_BASE", &self.discord.api_base),
            ("DISCORD_AUTHORIZE_URL", &self.discord.authorize_url),
        ] {
            Url::parse(value)
                .map_err(|e| AppError::config_invalid(format!("Invalid {name} '{value}': {e}")))?;
        }

        if self.token.ttl_secs == 0 {
            return Err(AppError::config_invalid(
                "ID_TOKEN_TTL_SECS must be greater than zero",
            ));
        }

        if self.discord.bot_token.is_none() && !self.token.role_guild_ids.is_empty() {
            warn!(
                guilds = ?self.token.role_guild_ids,
                "ROLE_GUILD_IDS is set but DISCORD_BOT_TOKEN is not, role claims are disabled"
            );
            self.token.role_guild_ids.clear();
        }

        Ok(())
    }

    /// Settings handed to the token exchange
    #[must_use]
    pub fn exchange_settings(&self) -> ExchangeSettings {
        ExchangeSettings {
            issuer: self.token.issuer.clone(),
            audience: self.discord.client_id.clone(),
            token_ttl_secs: self.token.ttl_secs,
            role_guild_ids: self.token.role_guild_ids.clone(),
        }
    }

    /// Human-readable configuration summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Discord OIDC Bridge Configuration:\n\
             - HTTP Port: {}\n\
             - Client ID: {}\n\
             - Redirect URI: {}\n\
             - Issuer: {}\n\
             - Token TTL: {}s\n\
             - Role Guilds: {}\n\
             - Key Store: {}",
            self.http_port,
            self.discord.client_id,
            self.discord.redirect_uri,
            self.token.issuer,
            self.token.ttl_secs,
            if self.token.role_guild_ids.is_empty() {
                "None".to_owned()
            } else {
                self.token.role_guild_ids.join(", ")
            },
            self.key_store_path
                .as_ref()
                .map_or_else(|| "In-memory".to_owned(), |p| p.display().to_string()),
        )
    }
}

/// Parse a comma-separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

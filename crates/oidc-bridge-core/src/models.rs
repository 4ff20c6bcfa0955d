// ABOUTME: Identity and OAuth token models shared by the provider client and the exchange
// ABOUTME: Serialized field names match the claims the access gateway reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// OAuth 2.0 token returned by the identity provider's code exchange
///
/// Passed through to the caller unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// The access token string
    pub access_token: String,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    /// Refresh token issued alongside the access token
    pub refresh_token: String,
    /// Space-separated list of granted scopes
    pub scope: String,
}

/// Authenticated user profile as reported by the provider, without memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider user id (snowflake)
    pub id: String,
    /// Account username
    pub username: String,
    /// Legacy discriminator ("0" for migrated accounts)
    pub discriminator: String,
    /// Display name, when the user has set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    /// Whether the account email has been verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// User profile plus the ids of every guild the user has joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user id (snowflake)
    pub id: String,
    /// Account username
    pub username: String,
    /// Legacy discriminator ("0" for migrated accounts)
    pub discriminator: String,
    /// Display name, when the user has set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    /// Whether the account email has been verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Joined guild ids in provider response order
    #[serde(rename = "joinedGuildIds")]
    pub joined_guild_ids: Vec<String>,
}

impl Identity {
    /// Combine a profile with the user's guild memberships
    #[must_use]
    pub fn from_profile(profile: UserProfile, joined_guild_ids: Vec<String>) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            discriminator: profile.discriminator,
            global_name: profile.global_name,
            verified: profile.verified,
            email: profile.email,
            joined_guild_ids,
        }
    }

    /// Only an explicit `true` passes the verification gate
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified == Some(true)
    }

    /// Whether the user has joined the given guild
    #[must_use]
    pub fn has_joined(&self, guild_id: &str) -> bool {
        self.joined_guild_ids.iter().any(|id| id == guild_id)
    }
}

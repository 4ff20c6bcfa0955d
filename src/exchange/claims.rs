// ABOUTME: Identity token claim set and the pure composer that builds it
// ABOUTME: Role memberships are a typed map serialized under roles:<guild id> keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Identity Token Claims
//!
//! The payload is the union of the registered claims (`iss`, `aud`, `iat`,
//! `exp`), every [`Identity`] field, one `roles:<guild id>` entry per looked-up
//! guild, and `guilds`. Role keys always carry the prefix, so they cannot
//! collide with identity fields.

use oidc_bridge_core::constants::claims::ROLE_CLAIM_PREFIX;
use oidc_bridge_core::models::Identity;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Role ids per guild, keyed by guild id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleClaims(BTreeMap<String, Vec<String>>);

impl RoleClaims {
    /// Empty role claims
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user's roles in one guild
    pub fn insert(&mut self, guild_id: impl Into<String>, roles: Vec<String>) {
        self.0.insert(guild_id.into(), roles);
    }

    /// Roles recorded for a guild
    #[must_use]
    pub fn get(&self, guild_id: &str) -> Option<&[String]> {
        self.0.get(guild_id).map(Vec::as_slice)
    }

    /// Guild ids with recorded roles, in key order
    pub fn guild_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of guilds with recorded roles
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no guild roles were recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Claim name for a guild's roles
    #[must_use]
    pub fn claim_name(guild_id: &str) -> String {
        format!("{ROLE_CLAIM_PREFIX}{guild_id}")
    }
}

impl FromIterator<(String, Vec<String>)> for RoleClaims {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RoleClaims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (guild_id, roles) in &self.0 {
            map.serialize_entry(&Self::claim_name(guild_id), roles)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RoleClaims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RoleClaimsVisitor;

        impl<'de> Visitor<'de> for RoleClaimsVisitor {
            type Value = RoleClaims;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of roles:<guild id> claims")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut claims = RoleClaims::new();
                while let Some(key) = access.next_key::<String>()? {
                    match key.strip_prefix(ROLE_CLAIM_PREFIX) {
                        Some(guild_id) => {
                            let roles = access.next_value::<Vec<String>>()?;
                            claims.insert(guild_id, roles);
                        }
                        None => {
                            access.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(claims)
            }
        }

        deserializer.deserialize_map(RoleClaimsVisitor)
    }
}

/// Complete identity token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Issuer
    pub iss: String,
    /// Audience, the OAuth client id
    pub aud: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Every identity field, unchanged
    #[serde(flatten)]
    pub identity: Identity,
    /// `roles:<guild id>` entries
    #[serde(flatten)]
    pub roles: RoleClaims,
    /// Full joined-guild list
    pub guilds: Vec<String>,
}

/// Builds [`IdentityClaims`] from an identity and its role claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsComposer {
    issuer: String,
    audience: String,
    ttl_secs: u64,
}

impl ClaimsComposer {
    /// Create a composer for one issuer/audience pair
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_secs,
        }
    }

    /// Compose the claim set; `issued_at` is Unix seconds
    #[must_use]
    pub fn compose(&self, identity: Identity, roles: RoleClaims, issued_at: i64) -> IdentityClaims {
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        let guilds = identity.joined_guild_ids.clone();
        IdentityClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
            identity,
            roles,
            guilds,
        }
    }
}

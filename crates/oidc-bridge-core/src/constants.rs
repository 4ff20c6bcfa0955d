// ABOUTME: Constants module with domain-separated organization
// ABOUTME: JWT signing, Discord endpoint, and claim naming constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single list.

/// Identity token signing constants
pub mod jwt {
    /// JWS algorithm advertised in token headers and the JWKS document
    pub const ALGORITHM: &str = "RS256";

    /// Fixed key identifier for the single signing key
    pub const KEY_ID: &str = "jwtRS256";

    /// RSA modulus length in bits
    pub const RSA_KEY_SIZE: usize = 2048;

    /// Default identity token lifetime (1 hour)
    pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

    /// Default `iss` claim, the value the access gateway expects
    pub const DEFAULT_ISSUER: &str = "https://cloudflare.com";
}

/// Discord API constants
pub mod discord {
    /// REST API root
    pub const API_BASE: &str = "https://discord.com/api/v10";

    /// Authorization page for the browser redirect
    pub const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";

    /// Scope requested for the code exchange
    pub const TOKEN_SCOPE: &str = "identify email";

    /// Scope requested when the caller also wants guild membership
    pub const GUILDS_SCOPE: &str = "identify email guilds";
}

/// Claim naming constants
pub mod claims {
    /// Namespace prefix for per-guild role claims (`roles:<guildId>`)
    pub const ROLE_CLAIM_PREFIX: &str = "roles:";
}

/// Service identity constants
pub mod service_names {
    /// Service name used for logging
    pub const OIDC_BRIDGE: &str = "discord-oidc-bridge";
}

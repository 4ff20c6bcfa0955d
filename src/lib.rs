// ABOUTME: Main library entry point for the Discord OIDC bridge
// ABOUTME: Turns Discord OAuth2 logins into RS256-signed OpenID Connect identity tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Discord OIDC Bridge
//!
//! An OpenID Connect shim for Discord. A relying party (typically an access
//! gateway) sends users through `/authorize`, then posts the resulting
//! authorization code to `/token`. The bridge exchanges the code with Discord,
//! reads the user's profile, guild memberships and selected guild roles, and
//! returns an RS256 identity token verifiable through `/jwks.json`.
//!
//! ## Architecture
//!
//! - **Keys**: JWK conversion, the single-record `KeyStore`, and the
//!   obtain-or-create signing key lifecycle
//! - **Identity**: the `IdentityProvider` contract and its Discord client
//! - **Exchange**: orchestration, claim composition, and the typed `TokenError`
//! - **Routes**: axum endpoints over a shared context
//! - **Config** / **Logging**: environment-driven settings and `tracing` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use discord_oidc_bridge::config::ServerConfig;
//! use oidc_bridge_core::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     discord_oidc_bridge::server::serve(&config, std::future::pending()).await
//! }
//! ```

/// Environment-driven configuration
pub mod config;
/// Authorization code to identity token exchange
pub mod exchange;
/// Identity provider contract and Discord client
pub mod identity;
/// Signing key storage and lifecycle
pub mod keys;
/// Logging configuration and initialization
pub mod logging;
/// HTTP routes
pub mod routes;
/// Component wiring and the HTTP server loop
pub mod server;
/// Shared helpers
pub mod utils;

// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-driven Discord credentials, token parameters, and key storage location
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration module for the Discord OIDC bridge
//!
//! All settings come from environment variables; see [`environment::ServerConfig`].

/// Environment and server configuration
pub mod environment;

pub use environment::{DiscordConfig, ServerConfig, TokenConfig};

// ABOUTME: Shared HTTP client utilities with connection pooling and timeout configuration
// ABOUTME: Builds the reqwest clients used for identity provider calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Request timeout for provider REST calls
const PROVIDER_TIMEOUT_SECS: u64 = 15;
/// Connect timeout for provider REST calls
const PROVIDER_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Create a new HTTP client with custom timeout settings
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(concat!("discord-oidc-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Create a new HTTP client for OAuth and identity lookups
///
/// Token exchanges and profile reads should be fast, so timeouts are short.
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(PROVIDER_TIMEOUT_SECS, PROVIDER_CONNECT_TIMEOUT_SECS)
}

// ABOUTME: Identity provider abstraction and the Discord implementation
// ABOUTME: The token exchange depends only on the trait; Discord is wired in by the binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Discord REST client
pub mod discord;
/// Provider trait and error type
pub mod provider;

pub use discord::DiscordProvider;
pub use provider::{IdentityProvider, ProviderError};

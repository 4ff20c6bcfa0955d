// ABOUTME: Authorization code to identity token exchange
// ABOUTME: Orchestrator, claim composition, and the typed exchange error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Claim set and composer
pub mod claims;
/// Exchange failure type
pub mod errors;
/// Exchange pipeline
pub mod orchestrator;

pub use claims::{ClaimsComposer, IdentityClaims, RoleClaims};
pub use errors::{TokenError, TokenErrorKind};
pub use orchestrator::{ExchangeOutcome, ExchangeSettings, TokenExchange};

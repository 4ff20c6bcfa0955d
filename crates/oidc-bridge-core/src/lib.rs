// ABOUTME: Core types and constants for the Discord OIDC bridge
// ABOUTME: Foundation crate with error handling, identity models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # OIDC Bridge Core
//!
//! Foundation crate providing shared types and constants for the Discord OIDC
//! bridge. This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Identity and OAuth token models shared by the provider and the exchange

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`OAuthToken`, `Identity`, `UserProfile`)
pub mod models;

// ABOUTME: Utility module collection for shared helpers
// ABOUTME: Currently the pooled HTTP client factory used by the identity provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// HTTP client construction with timeout configuration
pub mod http_client;

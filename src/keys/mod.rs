// ABOUTME: Signing key management for identity tokens
// ABOUTME: JWK conversion, single-record key storage, and the obtain-or-create key lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// RSA JWK export/import and the JWKS document
pub mod jwk;
/// Key lifecycle manager and signing key pair
pub mod lifecycle;
/// `KeyStore` trait with in-memory and file implementations
pub mod store;

pub use jwk::{JsonWebKeySet, RsaJwk};
pub use lifecycle::{KeyLifecycleManager, SigningKeyPair};
pub use store::{FileKeyStore, InMemoryKeyStore, KeyEntry, KeyStore};

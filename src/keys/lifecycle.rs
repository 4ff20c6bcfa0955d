// ABOUTME: Signing key lifecycle: load the persisted RS256 key pair or generate and persist one
// ABOUTME: Also signs identity tokens and exports the public half for the JWKS endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Signing Key Lifecycle
//!
//! The bridge signs every identity token with one RSA key pair that lives in a
//! [`KeyStore`]. The first call on an empty store generates a 2048-bit
//! RSASSA-PKCS1-v1_5 key and persists it with `put_if_absent`; later calls
//! import the stored JWKs. Keys are loaded per operation and never cached here.
//!
//! When several first-use calls race, every caller ends up with whichever pair
//! the store accepted, so tokens always verify against the published key.

use super::jwk::{JsonWebKeySet, RsaJwk};
use super::store::{KeyEntry, KeyStore};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use oidc_bridge_core::constants::jwt;
use oidc_bridge_core::errors::{AppError, AppResult};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, warn};

/// RS256 key pair in usable form
#[derive(Clone)]
pub struct SigningKeyPair {
    /// Private key, used only for signing
    pub private_key: RsaPrivateKey,
    /// Public key, used only for verification
    pub public_key: RsaPublicKey,
}

impl SigningKeyPair {
    /// Generate a fresh 2048-bit key pair with public exponent 65537
    ///
    /// CPU-bound; async callers should go through [`KeyLifecycleManager`].
    ///
    /// # Errors
    /// Returns an error if key generation fails
    pub fn generate() -> AppResult<Self> {
        let private_key = RsaPrivateKey::new(&mut OsRng, jwt::RSA_KEY_SIZE)
            .map_err(|e| AppError::crypto(format!("Failed to generate RSA private key: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Import both halves of a persisted entry
    ///
    /// # Errors
    /// Returns an error if either JWK is malformed or the halves do not match
    pub fn from_entry(entry: &KeyEntry) -> AppResult<Self> {
        let public_key = entry.public_key.to_public_key()?;
        let private_key = entry.private_key.to_private_key()?;
        if private_key.n() != public_key.n() || private_key.e() != public_key.e() {
            return Err(AppError::crypto(
                "Stored public key does not belong to the stored private key",
            ));
        }
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Export both halves for persistence
    ///
    /// # Errors
    /// Returns an error if the private key cannot be expressed as a JWK
    pub fn to_entry(&self) -> AppResult<KeyEntry> {
        Ok(KeyEntry {
            public_key: RsaJwk::from_public_key(&self.public_key),
            private_key: RsaJwk::from_private_key(&self.private_key)?,
        })
    }

    /// Public key as published through the JWKS endpoint
    #[must_use]
    pub fn public_jwk(&self) -> RsaJwk {
        RsaJwk::from_public_key(&self.public_key).to_published()
    }

    /// Get encoding key for JWT signing
    ///
    /// # Errors
    /// Returns an error if PEM export or key parsing fails
    pub fn encoding_key(&self) -> AppResult<EncodingKey> {
        let pem = self
            .private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| AppError::crypto(format!("Failed to export private key as PEM: {e}")))?;
        EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::crypto(format!("Failed to create encoding key: {e}")))
    }

    /// Get decoding key for JWT verification, built from the public JWK
    ///
    /// # Errors
    /// Returns an error if the modulus or exponent cannot be parsed
    pub fn decoding_key(&self) -> AppResult<DecodingKey> {
        let jwk = RsaJwk::from_public_key(&self.public_key);
        DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| AppError::crypto(format!("Failed to create decoding key: {e}")))
    }

    /// Sign claims as an RS256 JWT carrying the fixed key id
    ///
    /// # Errors
    /// Returns an error if the encoding key cannot be built or signing fails
    pub fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(jwt::KEY_ID.to_owned());

        encode(&header, claims, &self.encoding_key()?)
            .map_err(|e| AppError::crypto(format!("Failed to encode RS256 identity token: {e}")))
    }
}

/// Obtains the signing key pair from a [`KeyStore`], creating it on first use
#[derive(Clone)]
pub struct KeyLifecycleManager {
    store: Arc<dyn KeyStore>,
}

impl KeyLifecycleManager {
    /// Create a manager over the given store
    #[must_use]
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Load the stored key pair, or generate and persist one if the store is empty
    ///
    /// # Errors
    /// Returns an error if the store fails, or if key generation or import fails
    pub async fn get_or_create_signing_key(&self) -> AppResult<SigningKeyPair> {
        if let Some(entry) = self.store.get().await? {
            debug!("Importing persisted signing key");
            return SigningKeyPair::from_entry(&entry);
        }

        info!("No signing key stored, generating RSA key pair");
        let generated = task::spawn_blocking(SigningKeyPair::generate)
            .await
            .map_err(|e| AppError::internal(format!("Key generation task failed: {e}")))??;

        let candidate = generated.to_entry()?;
        let stored = self.store.put_if_absent(candidate.clone()).await?;
        if stored == candidate {
            info!(kid = jwt::KEY_ID, "Persisted new signing key");
            return Ok(generated);
        }

        warn!("Concurrent key generation detected, adopting the stored signing key");
        SigningKeyPair::from_entry(&stored)
    }

    /// Public verification key in JWK form
    ///
    /// # Errors
    /// Returns an error if the key cannot be loaded or created
    pub async fn public_signing_key(&self) -> AppResult<RsaJwk> {
        Ok(self.get_or_create_signing_key().await?.public_jwk())
    }

    /// JWKS document containing the single verification key
    ///
    /// # Errors
    /// Returns an error if the key cannot be loaded or created
    pub async fn jwks(&self) -> AppResult<JsonWebKeySet> {
        Ok(JsonWebKeySet {
            keys: vec![self.public_signing_key().await?],
        })
    }
}

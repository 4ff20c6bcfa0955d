// ABOUTME: RSA JSON Web Key conversion for persisting and publishing the signing key
// ABOUTME: Lossless export/import of RS256 key halves in RFC 7518 JWK form
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! JWK (JSON Web Key) representation of the RS256 signing key.
//!
//! Public keys carry `n` and `e`; private keys additionally carry `d`, the two
//! primes and the CRT parameters so that a persisted key re-imports exactly.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use oidc_bridge_core::constants::jwt;
use oidc_bridge_core::errors::{AppError, AppResult};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

/// JWK key operation for verification keys
pub const KEY_OP_VERIFY: &str = "verify";
/// JWK key operation for signing keys
pub const KEY_OP_SIGN: &str = "sign";

/// RSA JSON Web Key (public or private)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaJwk {
    /// Key type (always "RSA")
    pub kty: String,
    /// Intended use ("sig"), only set on published keys
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Key identifier, only set on published keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Algorithm (RS256)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Permitted operations ("sign" or "verify")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    /// Whether the key may be exported again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
    /// RSA modulus (base64url)
    pub n: String,
    /// RSA public exponent (base64url)
    pub e: String,
    /// Private exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// First prime factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    /// Second prime factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// First factor CRT exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    /// Second factor CRT exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    /// First CRT coefficient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

/// JWKS (JSON Web Key Set) container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Array of public keys
    pub keys: Vec<RsaJwk>,
}

impl RsaJwk {
    /// Export the public half for storage
    #[must_use]
    pub fn from_public_key(public_key: &RsaPublicKey) -> Self {
        Self {
            kty: "RSA".to_owned(),
            key_use: None,
            kid: None,
            alg: Some(jwt::ALGORITHM.to_owned()),
            key_ops: Some(vec![KEY_OP_VERIFY.to_owned()]),
            ext: Some(true),
            n: encode_uint(public_key.n()),
            e: encode_uint(public_key.e()),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
        }
    }

    /// Export the private half for storage
    ///
    /// # Errors
    /// Returns an error if the key does not have exactly two prime factors
    pub fn from_private_key(private_key: &RsaPrivateKey) -> AppResult<Self> {
        let [p, q] = private_key.primes() else {
            return Err(AppError::crypto(
                "Only two-prime RSA keys can be exported as JWK",
            ));
        };
        let d = private_key.d();
        let one = BigUint::from(1u8);
        let dp = d % (p - &one);
        let dq = d % (q - &one);
        // p is prime, so q^(p-2) mod p is the inverse of q
        let qi = q.modpow(&(p - BigUint::from(2u8)), p);

        Ok(Self {
            key_ops: Some(vec![KEY_OP_SIGN.to_owned()]),
            d: Some(encode_uint(d)),
            p: Some(encode_uint(p)),
            q: Some(encode_uint(q)),
            dp: Some(encode_uint(&dp)),
            dq: Some(encode_uint(&dq)),
            qi: Some(encode_uint(&qi)),
            ..Self::from_public_key(&RsaPublicKey::from(private_key))
        })
    }

    /// Public key form published through the JWKS endpoint
    #[must_use]
    pub fn to_published(&self) -> Self {
        Self {
            kty: self.kty.clone(),
            key_use: Some("sig".to_owned()),
            kid: Some(jwt::KEY_ID.to_owned()),
            alg: Some(jwt::ALGORITHM.to_owned()),
            key_ops: None,
            ext: None,
            n: self.n.clone(),
            e: self.e.clone(),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
        }
    }

    /// Import as a verification-only public key
    ///
    /// # Errors
    /// Returns an error if the JWK is not an RS256 verification key or its
    /// components are malformed
    pub fn to_public_key(&self) -> AppResult<RsaPublicKey> {
        self.check_usage(KEY_OP_VERIFY)?;
        let n = decode_uint("n", &self.n)?;
        let e = decode_uint("e", &self.e)?;
        RsaPublicKey::new(n, e)
            .map_err(|e| AppError::crypto(format!("Invalid RSA public key: {e}")))
    }

    /// Import as a signing-only private key
    ///
    /// # Errors
    /// Returns an error if private components are missing, malformed, or do not
    /// form a consistent RSA key
    pub fn to_private_key(&self) -> AppResult<RsaPrivateKey> {
        self.check_usage(KEY_OP_SIGN)?;
        let n = decode_uint("n", &self.n)?;
        let e = decode_uint("e", &self.e)?;
        let d = decode_uint("d", required("d", self.d.as_ref())?)?;
        let p = decode_uint("p", required("p", self.p.as_ref())?)?;
        let q = decode_uint("q", required("q", self.q.as_ref())?)?;

        let mut private_key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|e| AppError::crypto(format!("Invalid RSA private key: {e}")))?;
        private_key
            .validate()
            .map_err(|e| AppError::crypto(format!("RSA private key failed validation: {e}")))?;
        private_key
            .precompute()
            .map_err(|e| AppError::crypto(format!("RSA precomputation failed: {e}")))?;
        Ok(private_key)
    }

    fn check_usage(&self, operation: &str) -> AppResult<()> {
        if self.kty != "RSA" {
            return Err(AppError::crypto(format!(
                "Unsupported JWK key type: {}",
                self.kty
            )));
        }
        if let Some(alg) = &self.alg {
            if alg != jwt::ALGORITHM {
                return Err(AppError::crypto(format!("Unsupported JWK algorithm: {alg}")));
            }
        }
        if let Some(ops) = &self.key_ops {
            if !ops.iter().any(|op| op == operation) {
                return Err(AppError::crypto(format!(
                    "JWK key_ops {ops:?} do not permit {operation}"
                )));
            }
        }
        Ok(())
    }
}

fn required<'a>(name: &str, value: Option<&'a String>) -> AppResult<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| AppError::crypto(format!("JWK is missing private component '{name}'")))
}

fn encode_uint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

fn decode_uint(name: &str, encoded: &str) -> AppResult<BigUint> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| AppError::crypto(format!("JWK component '{name}' is not base64url: {e}")))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Verifier key material
//!
//! [`VerifierConfig`] holds the provider's RSA public key and the optional
//! pre-shared payload key. It is built once, before any verification, and is
//! never mutated afterwards; share it between request handlers behind an
//! [`std::sync::Arc`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use fident_web::VerifierConfig;
//!
//! let config = VerifierConfig::from_files(
//!     "keys/fident_public.pem",
//!     Some("0123456789abcdef0123456789abcdef"),
//! ).unwrap();
//! ```

use anyhow::{anyhow, Context, Result};
use jsonwebtoken::DecodingKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use std::fs;
use std::path::Path;

use crate::config::KeysConfig;

/// Immutable key material used by the token and notification verifiers
pub struct VerifierConfig {
    /// Provider public key, for the signature primitive
    public_key: RsaPublicKey,

    /// The same key in the form the claims decoder expects
    decoding_key: DecodingKey,

    /// Pre-shared AES key for the identity payload, if configured
    payload_key: Option<Vec<u8>>,
}

/// Hides key material from logs and debug output
impl std::fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("public_key", &"<RsaPublicKey>")
            .field("decoding_key", &"<DecodingKey>")
            .field(
                "payload_key",
                &self.payload_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl VerifierConfig {
    /// Build a configuration from a PEM encoded public key
    ///
    /// Both `RSA PUBLIC KEY` (PKCS#1) and `PUBLIC KEY` (SubjectPublicKeyInfo)
    /// encodings are accepted.
    ///
    /// # Arguments
    ///
    /// * `public_key_pem` - The provider's RSA public key
    /// * `payload_key` - The pre-shared payload key, as raw bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM data is not an RSA public key.
    pub fn from_pem(public_key_pem: &[u8], payload_key: Option<&[u8]>) -> Result<Self> {
        let pem = std::str::from_utf8(public_key_pem).context("Public key PEM is not UTF-8")?;

        let public_key = RsaPublicKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPublicKey::from_public_key_pem(pem))
            .map_err(|e| anyhow!("Failed to parse RSA public key: {}", e))?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)
            .context("Failed to build token decoding key")?;

        Ok(Self {
            public_key,
            decoding_key,
            payload_key: payload_key.map(<[u8]>::to_vec),
        })
    }

    /// Build a configuration from a public key file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold an RSA
    /// public key.
    pub fn from_files(
        public_key_path: impl AsRef<Path>,
        payload_key: Option<&str>,
    ) -> Result<Self> {
        let path = public_key_path.as_ref();
        let pem = fs::read(path)
            .with_context(|| format!("Failed to read public key file: {}", path.display()))?;
        Self::from_pem(&pem, payload_key.map(str::as_bytes))
    }

    /// Build a configuration from the `keys` section of the configuration file
    pub fn from_config(keys: &KeysConfig) -> Result<Self> {
        Self::from_files(&keys.public_key_path, keys.payload_key.as_deref())
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub fn payload_key(&self) -> Option<&[u8]> {
        self.payload_key.as_deref()
    }
}

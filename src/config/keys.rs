// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Key material configuration

use serde::{Deserialize, Serialize};

/// Location of the provider key material
///
/// # Example
///
/// ```
/// use fident_web::config::KeysConfig;
///
/// let keys = KeysConfig {
///     public_key_path: "keys/fident_public.pem".to_string(),
///     payload_key: Some("0123456789abcdef".to_string()),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Path of the PEM file holding the provider RSA public key.
    ///
    /// PKCS#1 (`RSA PUBLIC KEY`) and SubjectPublicKeyInfo (`PUBLIC KEY`)
    /// encodings are accepted.
    #[serde(default = "default_public_key_path")]
    pub public_key_path: String,

    /// Pre-shared key used to decrypt the identity payload of tokens.
    ///
    /// Raw string of 16, 24 or 32 bytes selecting AES-128, AES-192 or AES-256.
    /// Token verification fails with a configuration error when it is unset.
    #[serde(default)]
    pub payload_key: Option<String>,
}

fn default_public_key_path() -> String {
    "keys/fident_public.pem".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            public_key_path: default_public_key_path(),
            payload_key: None,
        }
    }
}

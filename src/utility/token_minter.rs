// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Token minting utility
//!
//! Produces tokens and notifications in the provider wire format from a
//! provider-like RSA private key. Used to run the application against a
//! local provider stand-in and by the test suites; production tokens are
//! only ever issued by the provider.
//!
//! # Example
//!
//! ```rust,no_run
//! use fident_web::utility::token_minter::TokenMinter;
//! use serde_json::json;
//!
//! let pem = std::fs::read("keys/fident_private.pem").unwrap();
//! let minter = TokenMinter::from_pem(&pem, b"0123456789abcdef0123456789abcdef")
//!     .unwrap()
//!     .with_issuer("fident-dev");
//! let token = minter
//!     .mint(&json!({"I": "id1", "N": "a@b.com", "T": 1, "A": []}))
//!     .unwrap();
//! ```

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde_json::Value;
use thiserror::Error;

use crate::crypto::{encrypt_payload, signature};
use crate::error::PayloadError;
use crate::notification::{canonical, LegacyNotification, SignedEnvelope};
use crate::token::TokenClaims;

/// Default token lifetime, in seconds
pub const DEFAULT_LIFETIME_SECONDS: i64 = 3600;

/// Specific errors for token minting
#[derive(Error, Debug)]
pub enum TokenMintError {
    #[error("Failed to load RSA private key: {reason}")]
    KeyLoading { reason: String },

    #[error("Failed to encrypt identity payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("Failed to serialize identity: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token signing failed: {reason}")]
    Signing { reason: String },
}

/// Issues provider-format tokens and notifications
pub struct TokenMinter {
    private_key: RsaPrivateKey,
    encoding_key: EncodingKey,
    payload_key: Vec<u8>,
    issuer: Option<String>,
    lifetime_seconds: i64,
}

impl std::fmt::Debug for TokenMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMinter")
            .field("private_key", &"<RsaPrivateKey>")
            .field("encoding_key", &"<EncodingKey>")
            .field("payload_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("lifetime_seconds", &self.lifetime_seconds)
            .finish()
    }
}

impl TokenMinter {
    /// Create a minter from a PEM private key (PKCS#1 or PKCS#8)
    ///
    /// # Arguments
    ///
    /// * `private_key_pem` - RSA private key matching the verifier public key
    /// * `payload_key` - Payload key shared with the verifier
    pub fn from_pem(private_key_pem: &[u8], payload_key: &[u8]) -> Result<Self, TokenMintError> {
        let pem = std::str::from_utf8(private_key_pem).map_err(|e| TokenMintError::KeyLoading {
            reason: e.to_string(),
        })?;
        let private_key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| TokenMintError::KeyLoading {
                reason: e.to_string(),
            })?;
        let encoding_key =
            EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| TokenMintError::KeyLoading {
                reason: e.to_string(),
            })?;

        Ok(Self {
            private_key,
            encoding_key,
            payload_key: payload_key.to_vec(),
            issuer: None,
            lifetime_seconds: DEFAULT_LIFETIME_SECONDS,
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the token lifetime; a negative lifetime yields expired tokens
    pub fn with_lifetime(mut self, seconds: i64) -> Self {
        self.lifetime_seconds = seconds;
        self
    }

    /// Sign arbitrary claims as an RS256 token
    pub fn sign_claims(&self, claims: &TokenClaims) -> Result<String, TokenMintError> {
        encode(&Header::new(Algorithm::RS256), claims, &self.encoding_key).map_err(|e| {
            TokenMintError::Signing {
                reason: e.to_string(),
            }
        })
    }

    /// Mint a token carrying `identity` as its encrypted payload
    ///
    /// `sub` is taken from the identity id (`I`) and `account_type` from `T`.
    pub fn mint(&self, identity: &Value) -> Result<String, TokenMintError> {
        let plaintext = serde_json::to_vec(identity)?;
        let now = Utc::now().timestamp();

        let mut claims = TokenClaims::new()
            .with_payload(encrypt_payload(&self.payload_key, &plaintext)?)
            .with_issued_at(now)
            .with_expiry(now + self.lifetime_seconds);
        if let Some(issuer) = &self.issuer {
            claims = claims.with_issuer(issuer.clone());
        }
        if let Some(id) = identity.get("I").and_then(Value::as_str) {
            claims = claims.with_subject(id);
        }
        if let Some(account_type) = identity.get("T").and_then(Value::as_i64) {
            claims = claims.with_account_type(account_type);
        }

        self.sign_claims(&claims)
    }

    /// Wrap a user record in a signed opaque envelope
    pub fn sign_notification(
        &self,
        record: &Value,
        payload_type: i64,
    ) -> Result<SignedEnvelope, TokenMintError> {
        let data = serde_json::to_string(record)?;
        let signature = self.sign_bytes(data.as_bytes())?;
        Ok(SignedEnvelope {
            data,
            payload_type,
            signature,
        })
    }

    /// Fill in the signature of a field-concatenation notification
    pub fn sign_legacy_notification(
        &self,
        notification: &mut LegacyNotification,
    ) -> Result<(), TokenMintError> {
        let canonical = canonical::canonical_string(&notification.to_update());
        notification.signature = self.sign_bytes(canonical.as_bytes())?;
        Ok(())
    }

    fn sign_bytes(&self, message: &[u8]) -> Result<String, TokenMintError> {
        signature::sign(message, &self.private_key).map_err(|e| TokenMintError::Signing {
            reason: e.to_string(),
        })
    }
}

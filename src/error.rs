// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types
//!
//! Every verification failure is terminal: nothing in this crate retries, and
//! no partially verified record is ever returned alongside an error.

use rocket::http::Status;
use thiserror::Error;

/// Failures of the payload decryptor
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("ciphertext too short ({len} bytes)")]
    CiphertextTooShort { len: usize },

    #[error("invalid payload key length: {len} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength { len: usize },

    #[error("payload encryption failed: {reason}")]
    Encryption { reason: String },
}

/// Failures of token verification
///
/// The variants follow the order of the verification pipeline: a token
/// is located, parsed, its algorithm and signature are checked, its claims are
/// validated, and finally the embedded payload is decrypted and deserialized.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("verifier is not configured: {0}")]
    Configuration(String),

    #[error("no token cookie present")]
    MissingToken,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("payload decryption failed: {0}")]
    Decryption(#[from] PayloadError),

    #[error("malformed identity payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

impl VerificationError {
    /// HTTP status used when the failure surfaces through a request guard
    pub fn status(&self) -> Status {
        match self {
            VerificationError::Configuration(_) => Status::InternalServerError,
            _ => Status::Unauthorized,
        }
    }
}

/// Failures while building provider URLs
#[derive(Error, Debug)]
pub enum UrlError {
    #[error("HMAC secret has not been set")]
    MissingRegistrationSecret,

    #[error("HMAC secret cannot be used as a key")]
    InvalidRegistrationSecret,

    #[error("invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_message() {
        let err = PayloadError::CiphertextTooShort { len: 3 };
        assert!(err.to_string().starts_with("ciphertext too short"));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            VerificationError::MissingToken.status(),
            Status::Unauthorized
        );
        assert_eq!(
            VerificationError::Configuration("no payload key".into()).status(),
            Status::InternalServerError
        );
        let wrapped: VerificationError = PayloadError::InvalidKeyLength { len: 5 }.into();
        assert!(matches!(wrapped, VerificationError::Decryption(_)));
    }
}

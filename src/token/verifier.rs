// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Token verification
//!
//! A provider token is a compact RS256 JWT whose `payload` claim holds the
//! encrypted identity of the user. Verification runs these steps in order,
//! stopping at the first failure:
//!
//! 1. locate the token in the `fident-token` cookie, falling back to
//!    `fident-token-ns` ([`TokenVerifier::verify_request`] only)
//! 2. split the token and read its header
//! 3. require the `RS256` algorithm
//! 4. check the signature over `header.claims` with the provider public key
//! 5. decode the claims and check their validity window (and issuer, when
//!    one is configured)
//! 6. decrypt the `payload` claim with the pre-shared payload key
//! 7. deserialize the identity JSON and attach the claims
//!
//! The algorithm is read from the header before any key is used, so a token
//! declaring `HS256` and signed with the public key as an HMAC secret, or a
//! token declaring `none`, never reaches the signature check.
//!
//! # Example
//!
//! ```rust,no_run
//! use fident_web::{TokenVerifier, VerifierConfig};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let config = VerifierConfig::from_files("keys/fident_public.pem", Some("0123456789abcdef")).unwrap();
//! let verifier = TokenVerifier::new(Arc::new(config));
//!
//! let mut cookies = HashMap::new();
//! cookies.insert("fident-token".to_string(), "eyJ...".to_string());
//! match verifier.verify_request(&cookies) {
//!     Ok(identity) => println!("Signed in as {}", identity.email_address()),
//!     Err(e) => println!("Not signed in: {}", e),
//! }
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, Validation};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::crypto::{decrypt_payload, signature};
use crate::error::VerificationError;
use crate::token::claims::TokenClaims;
use crate::token::identity::{Identity, IdentityPayload};
use crate::token::keys::VerifierConfig;

/// Cookie holding the token on secure (HTTPS) deployments
pub const TOKEN_COOKIE: &str = "fident-token";

/// Cookie holding the token when the secure cookie could not be set
pub const TOKEN_COOKIE_NON_SECURE: &str = "fident-token-ns";

/// The only algorithm provider tokens are signed with
const EXPECTED_ALGORITHM: &str = "RS256";

/// Read access to the cookies of an incoming request
pub trait TokenSource {
    /// Value of the named cookie, if present
    fn cookie(&self, name: &str) -> Option<String>;
}

impl TokenSource for HashMap<String, String> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl TokenSource for rocket::http::CookieJar<'_> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get(name).map(|c| c.value().to_string())
    }
}

#[derive(Deserialize)]
struct TokenHeader {
    #[serde(default)]
    alg: Option<String>,
}

/// Verifies provider tokens and produces [`Identity`] records
///
/// Cheap to clone; the key material is shared.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: Arc<VerifierConfig>,
    expected_issuer: Option<String>,
}

impl TokenVerifier {
    pub fn new(config: Arc<VerifierConfig>) -> Self {
        Self {
            config,
            expected_issuer: None,
        }
    }

    /// Require the `iss` claim to match `issuer`
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Locate the token cookie and verify it
    ///
    /// # Errors
    ///
    /// [`VerificationError::MissingToken`] if neither token cookie is present,
    /// otherwise any error of [`TokenVerifier::verify_token`].
    pub fn verify_request<S: TokenSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Identity, VerificationError> {
        let token = source
            .cookie(TOKEN_COOKIE)
            .or_else(|| source.cookie(TOKEN_COOKIE_NON_SECURE))
            .ok_or(VerificationError::MissingToken)?;
        self.verify_token(&token)
    }

    /// Verify a raw token string
    pub fn verify_token(&self, token: &str) -> Result<Identity, VerificationError> {
        let result = self.verify_inner(token);
        if let Err(e) = &result {
            debug!("Token rejected: {}", e);
        }
        result
    }

    fn verify_inner(&self, token: &str) -> Result<Identity, VerificationError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header_part, claims_part, signature_part] = segments.as_slice() else {
            return Err(malformed(format!(
                "expected 3 dot-separated segments, found {}",
                segments.len()
            )));
        };
        let signed_part = &token[..header_part.len() + 1 + claims_part.len()];

        check_algorithm(header_part)?;

        if !signature::verify(
            signed_part.as_bytes(),
            signature_part,
            self.config.public_key(),
        ) {
            return Err(VerificationError::InvalidSignature);
        }

        let claims = self.decode_claims(token)?;

        let payload_key = self.config.payload_key().ok_or_else(|| {
            VerificationError::Configuration("no payload key configured".to_string())
        })?;
        let payload = match &claims.payload {
            Some(Value::String(payload)) => payload.as_str(),
            Some(_) => {
                return Err(VerificationError::InvalidToken(
                    "payload claim is not a string".to_string(),
                ))
            }
            None => {
                return Err(VerificationError::InvalidToken(
                    "missing payload claim".to_string(),
                ))
            }
        };

        let plaintext = decrypt_payload(payload_key, payload)?;
        let identity: IdentityPayload =
            serde_json::from_slice(&plaintext).map_err(VerificationError::MalformedPayload)?;

        Ok(Identity::from_verified(identity, claims))
    }

    /// Validate the registered claims and deserialize them
    fn decode_claims(&self, token: &str) -> Result<TokenClaims, VerificationError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.required_spec_claims.clear();
        if let Some(issuer) = &self.expected_issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<TokenClaims>(token, self.config.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => VerificationError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                    VerificationError::UnexpectedAlgorithm(e.to_string())
                }
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => malformed(e.to_string()),
                _ => VerificationError::InvalidToken(e.to_string()),
            })
    }
}

fn malformed(reason: impl Into<String>) -> VerificationError {
    VerificationError::MalformedToken(reason.into())
}

/// Read the header segment and require [`EXPECTED_ALGORITHM`]
fn check_algorithm(header_part: &str) -> Result<(), VerificationError> {
    let raw = URL_SAFE_NO_PAD
        .decode(header_part.trim_end_matches('='))
        .map_err(|e| malformed(format!("header is not base64url: {}", e)))?;
    let header: TokenHeader =
        serde_json::from_slice(&raw).map_err(|e| malformed(format!("header: {}", e)))?;

    match header.alg.as_deref() {
        Some(EXPECTED_ALGORITHM) => Ok(()),
        Some(other) => Err(VerificationError::UnexpectedAlgorithm(other.to_string())),
        None => Err(VerificationError::UnexpectedAlgorithm(
            "no algorithm declared".to_string(),
        )),
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Typed token claims
//!
//! Claims are deserialized once, while the token is decoded. Every accessor
//! returns an `Option`: a claim that is absent or has the wrong type is `None`
//! rather than a panic or a sentinel. A mistyped registered claim never fails
//! the token on its own; the verifier only insists on a string `payload`.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deserialize a claim, turning a value of the wrong type into `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Claims carried by a provider token
///
/// Registered claims are typed; anything else the provider adds is kept in
/// [`TokenClaims::custom`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) iss: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) sub: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) iat: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) exp: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) nbf: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) account_type: Option<i64>,

    /// Encrypted identity payload, kept as sent so the verifier can tell a
    /// missing claim from a mistyped one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) payload: Option<Value>,

    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.sub = Some(subject.into());
        self
    }

    pub fn with_issued_at(mut self, issued_at: i64) -> Self {
        self.iat = Some(issued_at);
        self
    }

    pub fn with_expiry(mut self, expiry: i64) -> Self {
        self.exp = Some(expiry);
        self
    }

    pub fn with_not_before(mut self, not_before: i64) -> Self {
        self.nbf = Some(not_before);
        self
    }

    pub fn with_account_type(mut self, account_type: i64) -> Self {
        self.account_type = Some(account_type);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(Value::String(payload.into()));
        self
    }

    /// Add a provider-specific claim
    pub fn with_custom(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.nbf.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn account_type(&self) -> Option<i64> {
        self.account_type
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Value::as_str)
    }

    /// Look up a claim not covered by the typed accessors
    pub fn custom(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_claims_are_none() {
        let claims: TokenClaims = serde_json::from_value(json!({})).unwrap();
        assert!(claims.issuer().is_none());
        assert!(claims.subject().is_none());
        assert!(claims.issued_at().is_none());
        assert!(claims.expires_at().is_none());
        assert!(claims.payload().is_none());
    }

    #[test]
    fn typed_and_custom_claims() {
        let claims: TokenClaims = serde_json::from_value(json!({
            "iss": "fident",
            "sub": "id1",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
            "account_type": 2,
            "payload": "abc",
            "tenant": "acme"
        }))
        .unwrap();

        assert_eq!(claims.issuer(), Some("fident"));
        assert_eq!(claims.subject(), Some("id1"));
        assert_eq!(claims.issued_at().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_003_600);
        assert_eq!(claims.account_type(), Some(2));
        assert_eq!(claims.payload(), Some("abc"));
        assert_eq!(claims.custom("tenant"), Some(&json!("acme")));
        assert!(claims.custom("iss").is_none());
    }

    #[test]
    fn mistyped_claims_are_none() {
        let claims: TokenClaims = serde_json::from_value(json!({
            "iss": 42,
            "sub": ["id1"],
            "iat": 1_700_000_000.5,
            "exp": "tomorrow",
            "nbf": null,
            "account_type": "admin",
            "payload": 7,
            "tenant": "acme"
        }))
        .unwrap();

        assert!(claims.issuer().is_none());
        assert!(claims.subject().is_none());
        assert!(claims.issued_at().is_none());
        assert!(claims.expires_at().is_none());
        assert!(claims.not_before().is_none());
        assert!(claims.account_type().is_none());
        assert!(claims.payload().is_none());
        assert_eq!(claims.custom("tenant"), Some(&json!("acme")));
    }

    #[test]
    fn builder_serializes_only_set_claims() {
        let claims = TokenClaims::new()
            .with_subject("id1")
            .with_custom("scope", json!(["read"]));
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, json!({"sub": "id1", "scope": ["read"]}));
    }
}

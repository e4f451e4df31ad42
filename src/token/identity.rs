// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Identity records
//!
//! - [`Identity`]: the verified user, only produced by [`crate::TokenVerifier`]
//! - [`IdentityUpdate`]: the user record carried by a provider notification
//! - [`Attributes`]: the ordered `(key, value)` list shared by both
//!
//! The provider serializes identities with single letter keys:
//!
//! | Key | Field |
//! |-----|-------|
//! | `I` | identity id |
//! | `N` | username (the email address) |
//! | `T` | account type |
//! | `A` | attributes, `[{"I", "K", "V"}]` |
//! | `U` | user agent |
//! | `M` | MFA enabled |
//! | `V` | verified |

use serde::{Deserialize, Deserializer, Serialize};

use crate::attributes;
use crate::token::claims::TokenClaims;

/// A single identity attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "I", alias = "ID", default)]
    pub id: String,
    #[serde(rename = "K", alias = "Key")]
    pub key: String,
    #[serde(rename = "V", alias = "Value")]
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered attribute list
///
/// Names are read by scanning the list on every call; nothing is cached.
/// A JSON `null` deserializes to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(Vec<Attribute>);

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Option::<Vec<Attribute>>::deserialize(deserializer)?;
        Ok(Attributes(list.unwrap_or_default()))
    }
}

impl From<Vec<Attribute>> for Attributes {
    fn from(list: Vec<Attribute>) -> Self {
        Attributes(list)
    }
}

impl Attributes {
    /// Value of the first attribute with the given key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// First name, or the empty string if the provider sent none
    pub fn first_name(&self) -> &str {
        self.get(attributes::FIRST_NAME).unwrap_or("")
    }

    /// Last name, or the empty string if the provider sent none
    pub fn last_name(&self) -> &str {
        self.get(attributes::LAST_NAME).unwrap_or("")
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[Attribute] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Identity JSON as decrypted from a token payload
#[derive(Debug, Deserialize)]
pub(crate) struct IdentityPayload {
    #[serde(rename = "I")]
    id: String,
    #[serde(rename = "N")]
    username: String,
    #[serde(rename = "T", default)]
    account_type: i8,
    #[serde(rename = "A")]
    attributes: Attributes,
    #[serde(rename = "U", default)]
    user_agent: String,
    #[serde(rename = "M", default)]
    mfa_enabled: bool,
    #[serde(rename = "V", default)]
    is_verified: bool,
}

/// A verified user identity
///
/// There is no public constructor: an `Identity` is the output of a
/// successful [`crate::TokenVerifier`] run and nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    id: String,
    username: String,
    account_type: i8,
    attributes: Attributes,
    user_agent: String,
    mfa_enabled: bool,
    is_verified: bool,
    claims: TokenClaims,
}

impl Identity {
    pub(crate) fn from_verified(payload: IdentityPayload, claims: TokenClaims) -> Self {
        Self {
            id: payload.id,
            username: payload.username,
            account_type: payload.account_type,
            attributes: payload.attributes,
            user_agent: payload.user_agent,
            mfa_enabled: payload.mfa_enabled,
            is_verified: payload.is_verified,
            claims,
        }
    }

    /// Provider-assigned identity id, stable per user
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The username, which the provider guarantees is an email address
    pub fn email_address(&self) -> &str {
        &self.username
    }

    pub fn account_type(&self) -> i8 {
        self.account_type
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn mfa_enabled(&self) -> bool {
        self.mfa_enabled
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn first_name(&self) -> &str {
        self.attributes.first_name()
    }

    pub fn last_name(&self) -> &str {
        self.attributes.last_name()
    }

    /// Claims of the token this identity was verified from
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}

/// Wire form of a notification user record
///
/// Opaque envelopes carry the single letter keys used in token payloads;
/// the older field-concatenation notifications spell the names out.
#[derive(Debug, Deserialize)]
pub(crate) struct IdentityUpdateWire {
    #[serde(rename = "I", alias = "ID")]
    id: String,
    #[serde(rename = "N", alias = "Username")]
    username: String,
    #[serde(rename = "T", default)]
    account_type: i8,
    #[serde(rename = "A", alias = "Attributes", default)]
    attributes: Attributes,
    #[serde(rename = "U", default)]
    user_agent: String,
    #[serde(rename = "M", default)]
    mfa_enabled: bool,
    #[serde(rename = "V", default)]
    is_verified: bool,
    #[serde(rename = "C", alias = "Created", default)]
    created: Option<i64>,
}

/// User record delivered by a provider notification
///
/// Same shape as [`Identity`] without the token claims.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityUpdate {
    pub id: String,
    pub username: String,
    pub account_type: i8,
    pub attributes: Attributes,
    pub user_agent: String,
    pub mfa_enabled: bool,
    pub is_verified: bool,
    /// Creation time of the update (unix seconds), when the provider sent one
    pub created: Option<i64>,
    /// Notification type declared by the envelope
    pub notification_type: i64,
}

impl IdentityUpdateWire {
    pub(crate) fn into_update(self, notification_type: i64) -> IdentityUpdate {
        IdentityUpdate {
            id: self.id,
            username: self.username,
            account_type: self.account_type,
            attributes: self.attributes,
            user_agent: self.user_agent,
            mfa_enabled: self.mfa_enabled,
            is_verified: self.is_verified,
            created: self.created,
            notification_type,
        }
    }
}

impl IdentityUpdate {
    pub fn email_address(&self) -> &str {
        &self.username
    }

    pub fn first_name(&self) -> &str {
        self.attributes.first_name()
    }

    pub fn last_name(&self) -> &str {
        self.attributes.last_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_from(json: &str) -> Identity {
        let payload: IdentityPayload = serde_json::from_str(json).unwrap();
        Identity::from_verified(payload, TokenClaims::default())
    }

    #[test]
    fn names_from_attributes() {
        let identity = identity_from(
            r#"{"I":"id1","N":"a@b.com","T":1,
                "A":[{"I":"1","K":"firstname","V":"A"},{"I":"2","K":"lastname","V":"B"}]}"#,
        );
        assert_eq!(identity.first_name(), "A");
        assert_eq!(identity.last_name(), "B");
        assert_eq!(identity.email_address(), "a@b.com");
    }

    #[test]
    fn missing_names_are_empty() {
        let identity = identity_from(
            r#"{"I":"id1","N":"a@b.com","T":1,"A":[{"I":"1","K":"servicename","V":"svc"}]}"#,
        );
        assert_eq!(identity.first_name(), "");
        assert_eq!(identity.last_name(), "");
        assert_eq!(
            identity.attributes().get(attributes::SERVICE_NAME),
            Some("svc")
        );
    }

    #[test]
    fn optional_fields_default() {
        let identity = identity_from(r#"{"I":"id1","N":"a@b.com","T":3,"A":null}"#);
        assert!(identity.attributes().is_empty());
        assert_eq!(identity.user_agent(), "");
        assert!(!identity.mfa_enabled());
        assert!(!identity.is_verified());
        assert_eq!(identity.account_type(), 3);

        let full = identity_from(
            r#"{"I":"id1","N":"a@b.com","T":1,"A":[],"U":"curl/8","M":true,"V":true}"#,
        );
        assert_eq!(full.user_agent(), "curl/8");
        assert!(full.mfa_enabled());
        assert!(full.is_verified());
    }

    #[test]
    fn required_fields_are_enforced() {
        let missing_id = serde_json::from_str::<IdentityPayload>(r#"{"N":"x","T":1,"A":[]}"#);
        assert!(missing_id.is_err());
        let missing_username = serde_json::from_str::<IdentityPayload>(r#"{"I":"id1","T":1,"A":[]}"#);
        assert!(missing_username.is_err());
    }

    #[test]
    fn missing_type_defaults_to_zero() {
        let identity = identity_from(r#"{"I":"id1","N":"x","A":[]}"#);
        assert_eq!(identity.account_type(), 0);
    }

    #[test]
    fn update_accepts_both_spellings() {
        let short: IdentityUpdateWire = serde_json::from_str(
            r#"{"I":"id1","N":"a@b.com","T":1,"A":[{"I":"1","K":"firstname","V":"A"}]}"#,
        )
        .unwrap();
        let long: IdentityUpdateWire = serde_json::from_str(
            r#"{"ID":"id1","Username":"a@b.com","Created":42,
                "Attributes":[{"Key":"firstname","Value":"A"}]}"#,
        )
        .unwrap();

        let short = short.into_update(1);
        let long = long.into_update(1);
        assert_eq!(short.first_name(), "A");
        assert_eq!(long.first_name(), "A");
        assert_eq!(long.created, Some(42));
        assert_eq!(long.account_type, 0);
        assert_eq!(short.notification_type, 1);
        assert_eq!(short.email_address(), long.email_address());
    }
}

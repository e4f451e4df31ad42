// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Notification wire formats

use serde::{Deserialize, Serialize};

use crate::token::{Attribute, Attributes, IdentityUpdate};

/// Opaque signed envelope
///
/// `signature` covers the exact bytes of `data`, which is itself the JSON of
/// the user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    #[serde(alias = "Data")]
    pub data: String,
    #[serde(rename = "type", alias = "Type", default)]
    pub payload_type: i64,
    #[serde(alias = "Signature")]
    pub signature: String,
}

/// Flat notification signed over its canonical field string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyNotification {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Created", default)]
    pub created: i64,
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<LegacyAttribute>,
    #[serde(rename = "Type", default)]
    pub payload_type: i64,
    #[serde(rename = "Signature")]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAttribute {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl LegacyNotification {
    /// The user record, without the signature
    pub fn to_update(&self) -> IdentityUpdate {
        let attributes: Vec<Attribute> = self
            .attributes
            .iter()
            .map(|a| Attribute::new(a.key.clone(), a.value.clone()))
            .collect();
        IdentityUpdate {
            id: self.id.clone(),
            username: self.username.clone(),
            account_type: 0,
            attributes: Attributes::from(attributes),
            user_agent: String::new(),
            mfa_enabled: false,
            is_verified: false,
            created: Some(self.created),
            notification_type: self.payload_type,
        }
    }
}

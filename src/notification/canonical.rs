// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Canonical string of field-concatenation notifications
//!
//! ```text
//! "Attributes" + key1 + value1 + key2 + value2 + ...
//!   + "Created" + created
//!   + "ID" + id
//!   + "Type" + type
//!   + "Username" + username
//! ```
//!
//! Attributes are sorted by lower-cased key; keys equal once lower-cased are
//! ordered by their original spelling.

use std::cmp::Ordering;

use crate::token::{Attribute, IdentityUpdate};

/// Ordering applied to attributes before concatenation
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Attributes in canonical order
pub fn sorted_attributes(attributes: &[Attribute]) -> Vec<&Attribute> {
    let mut sorted: Vec<&Attribute> = attributes.iter().collect();
    sorted.sort_by(|a, b| compare_keys(&a.key, &b.key));
    sorted
}

/// Build the string the provider signed for `update`
pub fn canonical_string(update: &IdentityUpdate) -> String {
    let mut out = String::from("Attributes");
    for attribute in sorted_attributes(update.attributes.as_slice()) {
        out.push_str(&attribute.key);
        out.push_str(&attribute.value);
    }
    out.push_str("Created");
    out.push_str(&update.created.unwrap_or(0).to_string());
    out.push_str("ID");
    out.push_str(&update.id);
    out.push_str("Type");
    out.push_str(&update.notification_type.to_string());
    out.push_str("Username");
    out.push_str(&update.username);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Attributes;

    fn update(attributes: Vec<Attribute>) -> IdentityUpdate {
        IdentityUpdate {
            id: "id1".to_string(),
            username: "a@b.com".to_string(),
            account_type: 0,
            attributes: Attributes::from(attributes),
            user_agent: String::new(),
            mfa_enabled: false,
            is_verified: false,
            created: Some(1_600_000_000),
            notification_type: 2,
        }
    }

    #[test]
    fn sort_is_case_insensitive_with_case_sensitive_tie_break() {
        let attributes = vec![
            Attribute::new("lastname", "B"),
            Attribute::new("b", "2"),
            Attribute::new("FirstName", "A"),
            Attribute::new("B", "1"),
            Attribute::new("a", "0"),
        ];
        let keys: Vec<&str> = sorted_attributes(&attributes)
            .iter()
            .map(|a| a.key.as_str())
            .collect();
        assert_eq!(keys, ["a", "B", "b", "FirstName", "lastname"]);
    }

    #[test]
    fn field_order_and_labels() {
        let record = update(vec![
            Attribute::new("lastname", "B"),
            Attribute::new("firstname", "A"),
        ]);
        assert_eq!(
            canonical_string(&record),
            "AttributesfirstnameAlastnameBCreated1600000000IDid1Type2Usernamea@b.com"
        );
    }

    #[test]
    fn empty_attributes() {
        let mut record = update(vec![]);
        record.created = None;
        assert_eq!(
            canonical_string(&record),
            "AttributesCreated0IDid1Type2Usernamea@b.com"
        );
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Well-known identity attribute keys
//!
//! Attributes are free-form `(key, value)` pairs; these are the keys the
//! provider populates itself. Look them up with [`crate::Attributes::get`].

/// First name of the user
pub const FIRST_NAME: &str = "firstname";

/// Last name of the user
pub const LAST_NAME: &str = "lastname";

/// Name of the service an identity belongs to (service accounts)
pub const SERVICE_NAME: &str = "servicename";

/// Vendor of the service
pub const SERVICE_VENDOR: &str = "servicevendor";

/// Support email address of the service
pub const SUPPORT_ADDRESS: &str = "supportaddress";

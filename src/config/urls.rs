// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Redirect URL configuration

use serde::{Deserialize, Serialize};

/// Base URLs used to build provider redirects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlsConfig {
    /// Public base URL of this application.
    ///
    /// The provider sends users back here after login, logout or registration.
    #[serde(default = "default_product_url")]
    pub product_url: String,

    /// Base URL of the hosted provider pages
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Shared secret keying the `presig` of verified registration URLs.
    ///
    /// Leave unset if the application never builds verified registration URLs.
    #[serde(default)]
    pub registration_secret: Option<String>,
}

fn default_product_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_provider_url() -> String {
    "https://fident.io".to_string()
}

impl Default for UrlsConfig {
    fn default() -> Self {
        Self {
            product_url: default_product_url(),
            provider_url: default_provider_url(),
            registration_secret: None,
        }
    }
}

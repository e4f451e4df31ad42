// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Auth-setter reverse proxy configuration
//!
//! The auth-setter lets the provider set its token cookie on the
//! application's own domain: requests to `/as` are forwarded to the provider
//! token endpoint and the response, `Set-Cookie` included, is relayed back.

use serde::{Deserialize, Serialize};

/// Production token endpoint
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://authsetter.fident.io";

/// Token endpoint of a locally running provider
pub const DEV_TOKEN_ENDPOINT: &str = "http://localhost:7181";

/// Listening port in development mode
pub const DEV_PORT: u16 = 8088;

/// Settings of the auth-setter proxy
///
/// # Fields
///
/// * `token_endpoint` - Upstream provider endpoint (default: production)
/// * `address` - Bind address of the standalone proxy (default: 0.0.0.0)
/// * `port` - Bind port of the standalone proxy (default: 80)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthsetConfig {
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

impl Default for AuthsetConfig {
    fn default() -> Self {
        Self {
            token_endpoint: default_token_endpoint(),
            address: default_address(),
            port: default_port(),
        }
    }
}

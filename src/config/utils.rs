// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! Validation rules that serde alone cannot express.

use anyhow::{bail, Context, Result};
use log::debug;
use url::Url;

use super::Config;

/// Check if a string is a valid IP address
///
/// Accepts any IPv4 or IPv6 address plus `localhost`.
pub fn is_valid_ip_address(addr: &str) -> bool {
    addr.parse::<std::net::IpAddr>().is_ok() || addr == "localhost"
}

fn check_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{} must use http or https, got {}", name, url.scheme());
    }
    Ok(())
}

/// Validates the configuration against rules that aren't covered by deserialization.
///
/// # Arguments
///
/// * `config` - The configuration object to validate
///
/// # Returns
///
/// * `Ok(())` if all validations pass
/// * `Err(anyhow::Error)` with descriptive message if any validation fails
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Validating configuration rules");

    check_url("urls.product_url", &config.urls.product_url)?;
    check_url("urls.provider_url", &config.urls.provider_url)?;
    check_url("authset.token_endpoint", &config.authset.token_endpoint)?;

    if let Some(key) = &config.keys.payload_key {
        if !matches!(key.len(), 16 | 24 | 32) {
            bail!(
                "keys.payload_key must be 16, 24 or 32 bytes long, got {}",
                key.len()
            );
        }
    }

    if let Some(secret) = &config.urls.registration_secret {
        if secret.is_empty() {
            bail!("urls.registration_secret must not be empty when set");
        }
    }

    if !config.notifications.path.starts_with('/') {
        bail!(
            "notifications.path must start with '/', got {}",
            config.notifications.path
        );
    }

    if config.notifications.max_body == 0 {
        bail!("notifications.max_body must be greater than 0");
    }

    if !is_valid_ip_address(&config.authset.address) {
        bail!("authset.address is not a valid IP address: {}", config.authset.address);
    }
    if config.authset.port == 0 {
        bail!("authset.port must be between 1 and 65535");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_specific_rules(&Config::default()).is_ok());
    }

    #[test]
    fn ip_addresses() {
        assert!(is_valid_ip_address("0.0.0.0"));
        assert!(is_valid_ip_address("::1"));
        assert!(is_valid_ip_address("localhost"));
        assert!(!is_valid_ip_address("example.com"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.keys.payload_key = Some("too-short".to_string());
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.urls.provider_url = "not a url".to_string();
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.urls.product_url = "ftp://example.com".to_string();
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.notifications.path = "notify".to_string();
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.authset.port = 0;
        assert!(validate_specific_rules(&config).is_err());
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Configuration
//!
//! YAML configuration shared by the library helpers and the `authsetter`
//! binary. Every section falls back to defaults, so an empty file is valid:
//!
//! ```yaml
//! keys:
//!   public_key_path: keys/fident_public.pem
//!   payload_key: 0123456789abcdef0123456789abcdef
//! urls:
//!   product_url: https://app.example.com
//!   provider_url: https://fident.io
//!   registration_secret: shared-secret
//! notifications:
//!   enabled: true
//!   path: /fident/notify
//!   scheme: opaque_envelope
//!   max_body: 1048576
//! authset:
//!   token_endpoint: https://authsetter.fident.io
//!   address: 0.0.0.0
//!   port: 80
//! ```
//!
//! A missing file is created with the defaults. A file that fails to parse
//! or validate is left untouched; a `<name>.sample.yaml` with the defaults is
//! written next to it and loading fails.

pub mod authset;
pub mod keys;
pub mod notifications;
pub mod urls;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use authset::AuthsetConfig;
use authset::{DEV_PORT, DEV_TOKEN_ENDPOINT};
pub use keys::KeysConfig;
pub use notifications::NotificationsConfig;
pub use urls::UrlsConfig;
pub use utils::is_valid_ip_address;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider public key and payload key
    #[serde(default)]
    pub keys: KeysConfig,

    /// Base URLs for provider redirects
    #[serde(default)]
    pub urls: UrlsConfig,

    /// Notification endpoint settings
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Auth-setter reverse proxy settings
    #[serde(default)]
    pub authset: AuthsetConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the loaded values
    pub fn validate(&self) -> Result<()> {
        utils::validate_specific_rules(self)
    }

    /// Override the auth-setter settings from command line arguments
    ///
    /// Only the values that are provided replace the configured ones.
    pub fn apply_args(
        &mut self,
        token_endpoint: Option<String>,
        address: Option<String>,
        port: Option<u16>,
    ) {
        if let Some(endpoint) = token_endpoint {
            self.authset.token_endpoint = endpoint;
        }
        if let Some(address) = address {
            self.authset.address = address;
        }
        if let Some(port) = port {
            self.authset.port = port;
        }
    }

    /// Point the auth-setter at a locally running provider on port 8088
    ///
    /// Overrides the configured and command line endpoint and port.
    pub fn apply_dev_mode(&mut self) {
        self.authset.token_endpoint = DEV_TOKEN_ENDPOINT.to_string();
        self.authset.port = DEV_PORT;
    }
}

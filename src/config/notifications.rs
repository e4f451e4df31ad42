// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Notification endpoint configuration

use serde::{Deserialize, Serialize};

use crate::notification::NotificationScheme;
use crate::web::DEFAULT_MAX_BODY;

/// Settings of the notification endpoint
///
/// # Fields
///
/// * `enabled` - Mount the notification route (default: true)
/// * `path` - Mount point of the route (default: `/fident/notify`)
/// * `scheme` - Signing scheme of incoming notifications (default: `opaque_envelope`)
/// * `max_body` - Largest accepted body in bytes (default: 1 MiB)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Must start with `/`
    #[serde(default = "default_path")]
    pub path: String,

    /// `opaque_envelope` or `field_concatenation`; a deployment receives only one
    #[serde(default)]
    pub scheme: NotificationScheme,

    /// Larger bodies are dropped without reaching the handler
    #[serde(default = "default_max_body")]
    pub max_body: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    "/fident/notify".to_string()
}

fn default_max_body() -> u64 {
    DEFAULT_MAX_BODY
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_path(),
            scheme: NotificationScheme::default(),
            max_body: default_max_body(),
        }
    }
}

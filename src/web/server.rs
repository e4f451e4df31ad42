// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server assembly

use anyhow::{Context, Result};
use log::{debug, info};
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use std::sync::Arc;

use super::authset::{authset_routes, AuthsetProxy};
use super::notification::{notification_routes, NotificationBodyLimit};
use crate::config::Config;
use crate::notification::{NotificationHandler, NotificationVerifier};
use crate::token::{TokenVerifier, VerifierConfig};
use crate::url_helper::UrlHelper;

/// Everything the Fident routes and guards need, ready to be managed by Rocket
///
/// Each part is optional: the standalone auth-setter only needs the proxy,
/// an application using [`super::FidentUser`] needs the verifier.
#[derive(Debug, Default)]
pub struct FidentState {
    verifier: Option<TokenVerifier>,
    notifications: Option<(String, NotificationVerifier)>,
    notification_body_limit: NotificationBodyLimit,
    authset: Option<AuthsetProxy>,
    urls: Option<UrlHelper>,
}

impl FidentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every part from the configuration file
    ///
    /// The notification route is only set up when enabled; register its
    /// handler with [`FidentState::with_notification_handler`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let keys = Arc::new(
            VerifierConfig::from_config(&config.keys).context("Failed to load verifier keys")?,
        );

        let mut state = Self::new()
            .with_verifier(TokenVerifier::new(Arc::clone(&keys)))
            .with_authset(AuthsetProxy::new(&config.authset.token_endpoint)?)
            .with_urls(UrlHelper::from_config(&config.urls));

        if config.notifications.enabled {
            state = state
                .with_notifications(
                    config.notifications.path.clone(),
                    NotificationVerifier::new(keys, config.notifications.scheme),
                )
                .with_notification_body_limit(config.notifications.max_body);
        }
        Ok(state)
    }

    pub fn with_verifier(mut self, verifier: TokenVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_notifications(
        mut self,
        path: impl Into<String>,
        verifier: NotificationVerifier,
    ) -> Self {
        self.notifications = Some((path.into(), verifier));
        self
    }

    /// Cap the size of notification bodies, in bytes
    pub fn with_notification_body_limit(mut self, max_body: u64) -> Self {
        self.notification_body_limit = NotificationBodyLimit(max_body);
        self
    }

    /// Register the handler of the configured notification verifier
    ///
    /// Has no effect when notifications are disabled.
    pub fn with_notification_handler<H: NotificationHandler + 'static>(mut self, handler: H) -> Self {
        self.notifications = self
            .notifications
            .map(|(path, verifier)| (path, verifier.with_handler(handler)));
        self
    }

    pub fn with_authset(mut self, proxy: AuthsetProxy) -> Self {
        self.authset = Some(proxy);
        self
    }

    pub fn with_urls(mut self, urls: UrlHelper) -> Self {
        self.urls = Some(urls);
        self
    }

    /// Manage the configured parts and mount their routes
    pub fn attach_to(self, mut rocket: Rocket<Build>) -> Rocket<Build> {
        if let Some(verifier) = self.verifier {
            debug!("Managing token verifier");
            rocket = rocket.manage(verifier);
        }
        if let Some((path, verifier)) = self.notifications {
            info!("Mounting notification endpoint at {}", path);
            rocket = rocket
                .mount(path.as_str(), notification_routes())
                .manage(verifier)
                .manage(self.notification_body_limit);
        }
        if let Some(proxy) = self.authset {
            info!("Mounting auth-setter proxy at /as");
            rocket = rocket.mount("/", authset_routes()).manage(proxy);
        }
        if let Some(urls) = self.urls {
            rocket = rocket.manage(urls);
        }
        rocket
    }
}

/// Build a Rocket instance serving the Fident routes
///
/// # Arguments
///
/// * `figment` - The Rocket configuration figment containing server settings
/// * `state` - The Fident parts to manage and mount
///
/// # Example
///
/// ```rust,no_run
/// use fident_web::web::{build_rocket, FidentState, AuthsetProxy};
/// use rocket::figment::Figment;
///
/// # async fn run() -> anyhow::Result<()> {
/// let figment = Figment::from(rocket::Config::default());
/// let state = FidentState::new().with_authset(AuthsetProxy::new("https://authsetter.fident.io")?);
/// let _rocket = build_rocket(figment, state).launch().await?;
/// # Ok(())
/// # }
/// ```
pub fn build_rocket(figment: Figment, state: FidentState) -> Rocket<Build> {
    state.attach_to(rocket::custom(figment))
}

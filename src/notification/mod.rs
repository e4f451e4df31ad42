// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Provider notifications
//!
//! The provider pushes user updates to the application as signed JSON POST
//! bodies. Two signing schemes exist and a deployment uses exactly one:
//!
//! - [`NotificationScheme::OpaqueEnvelope`] (default): `{data, type, signature}`
//!   where the signature covers `data` verbatim and `data` is the user record
//! - [`NotificationScheme::FieldConcatenation`]: a flat record signed over a
//!   canonical concatenation of its fields, see [`canonical`]; kept for older
//!   deployments
//!
//! Nothing about a rejected notification is reported to the sender. Bad
//! bodies, bad signatures and a missing handler all produce the same empty
//! `200` response and a `warn` log line; only an acknowledged notification
//! gets the `con` body. Do not "fix" this by returning error codes: the
//! endpoint is unauthenticated.

pub mod canonical;
pub mod envelope;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::crypto::signature;
use crate::token::identity::IdentityUpdateWire;
use crate::token::{IdentityUpdate, VerifierConfig};

pub use envelope::{LegacyAttribute, LegacyNotification, SignedEnvelope};

/// Response body written when the handler acknowledges a notification
pub const CONFIRMATION: &str = "con";

/// Signing scheme of the notifications a deployment receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationScheme {
    #[default]
    OpaqueEnvelope,
    FieldConcatenation,
}

/// Application callback receiving verified user updates
///
/// Returns `true` to acknowledge the notification.
pub trait NotificationHandler: Send + Sync {
    fn handle(&self, update: &IdentityUpdate) -> bool;
}

impl<F> NotificationHandler for F
where
    F: Fn(&IdentityUpdate) -> bool + Send + Sync,
{
    fn handle(&self, update: &IdentityUpdate) -> bool {
        self(update)
    }
}

/// What happened to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Verified and acknowledged by the handler
    Acknowledged,
    /// Verified, the handler returned `false`
    Declined,
    /// Verified, but no handler is registered
    Unhandled,
    /// Signature check failed; the handler was not called
    Rejected,
    /// Body or user record could not be parsed
    Malformed,
}

impl NotificationOutcome {
    /// Body of the HTTP response for this outcome
    pub fn response_body(&self) -> Option<&'static str> {
        match self {
            NotificationOutcome::Acknowledged => Some(CONFIRMATION),
            _ => None,
        }
    }
}

/// Verifies notifications and hands them to the registered handler
#[derive(Clone)]
pub struct NotificationVerifier {
    config: Arc<VerifierConfig>,
    scheme: NotificationScheme,
    handler: Option<Arc<dyn NotificationHandler>>,
}

impl fmt::Debug for NotificationVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationVerifier")
            .field("config", &self.config)
            .field("scheme", &self.scheme)
            .field("handler", &self.handler.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

impl NotificationVerifier {
    pub fn new(config: Arc<VerifierConfig>, scheme: NotificationScheme) -> Self {
        Self {
            config,
            scheme,
            handler: None,
        }
    }

    /// Register the handler called for every verified notification
    pub fn with_handler<H: NotificationHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn scheme(&self) -> NotificationScheme {
        self.scheme
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Check the signature of an opaque envelope
    pub fn verify_envelope(&self, envelope: &SignedEnvelope) -> bool {
        signature::verify(
            envelope.data.as_bytes(),
            &envelope.signature,
            self.config.public_key(),
        )
    }

    /// Check the signature of a field-concatenation notification
    pub fn verify_legacy(&self, notification: &LegacyNotification) -> bool {
        let canonical = canonical::canonical_string(&notification.to_update());
        signature::verify(
            canonical.as_bytes(),
            &notification.signature,
            self.config.public_key(),
        )
    }

    /// Deserialize the user record of a verified envelope
    pub fn parse_update(envelope: &SignedEnvelope) -> Result<IdentityUpdate, serde_json::Error> {
        let wire: IdentityUpdateWire = serde_json::from_str(&envelope.data)?;
        Ok(wire.into_update(envelope.payload_type))
    }

    /// Verify a raw notification body and dispatch it
    pub fn process(&self, body: &[u8]) -> NotificationOutcome {
        let update = match self.scheme {
            NotificationScheme::OpaqueEnvelope => self.verified_envelope(body),
            NotificationScheme::FieldConcatenation => self.verified_legacy(body),
        };
        match update {
            Ok(update) => self.dispatch(&update),
            Err(outcome) => outcome,
        }
    }

    fn verified_envelope(&self, body: &[u8]) -> Result<IdentityUpdate, NotificationOutcome> {
        let envelope: SignedEnvelope = serde_json::from_slice(body).map_err(|e| {
            warn!("Dropping notification with malformed body: {}", e);
            NotificationOutcome::Malformed
        })?;
        if !self.verify_envelope(&envelope) {
            warn!("Dropping notification with invalid signature");
            return Err(NotificationOutcome::Rejected);
        }
        Self::parse_update(&envelope).map_err(|e| {
            warn!("Dropping signed notification with malformed user record: {}", e);
            NotificationOutcome::Malformed
        })
    }

    fn verified_legacy(&self, body: &[u8]) -> Result<IdentityUpdate, NotificationOutcome> {
        let notification: LegacyNotification = serde_json::from_slice(body).map_err(|e| {
            warn!("Dropping notification with malformed body: {}", e);
            NotificationOutcome::Malformed
        })?;
        if !self.verify_legacy(&notification) {
            warn!("Dropping notification with invalid signature");
            return Err(NotificationOutcome::Rejected);
        }
        Ok(notification.to_update())
    }

    /// Hand a verified update to the handler
    pub fn dispatch(&self, update: &IdentityUpdate) -> NotificationOutcome {
        let Some(handler) = &self.handler else {
            warn!("Received notification but no notification handler is registered");
            return NotificationOutcome::Unhandled;
        };
        if handler.handle(update) {
            debug!("Notification for identity {} acknowledged", update.id);
            NotificationOutcome::Acknowledged
        } else {
            debug!("Notification for identity {} declined", update.id);
            NotificationOutcome::Declined
        }
    }
}

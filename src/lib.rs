// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Fident web SDK
//!
//! Client-side helpers for applications delegating authentication to the
//! Fident hosted identity provider:
//!
//! - verification of provider tokens found in cookies ([`token`])
//! - decryption of the identity payload carried inside those tokens ([`crypto`])
//! - verification and dispatch of provider push notifications ([`notification`])
//! - redirect URLs to the hosted login, logout and registration pages ([`url_helper`])
//! - Rocket integration: request guard, notification route and the
//!   auth-setter reverse proxy ([`web`])

pub mod attributes;
pub mod config;
pub mod crypto;
pub mod error;
pub mod notification;
pub mod token;
pub mod url_helper;
pub mod utility;
pub mod web;

pub use error::{PayloadError, UrlError, VerificationError};
pub use notification::{NotificationHandler, NotificationScheme, NotificationVerifier};
pub use token::{Attribute, Attributes, Identity, IdentityUpdate, TokenClaims};
pub use token::{TokenSource, TokenVerifier, VerifierConfig};
pub use url_helper::UrlHelper;

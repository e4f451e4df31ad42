// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Provider token verification
//!
//! ## Submodules
//!
//! - [`keys`]: immutable verifier key material
//! - [`claims`]: typed token claims
//! - [`identity`]: verified identity and notification records
//! - [`verifier`]: the verification pipeline and cookie lookup

pub mod claims;
pub mod identity;
pub mod keys;
pub mod verifier;

pub use claims::TokenClaims;
pub use identity::{Attribute, Attributes, Identity, IdentityUpdate};
pub use keys::VerifierConfig;
pub use verifier::{TokenSource, TokenVerifier, TOKEN_COOKIE, TOKEN_COOKIE_NON_SECURE};

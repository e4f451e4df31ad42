// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Cryptographic primitives used by the token and notification verifiers
//!
//! - [`signature`]: RSASSA-PKCS1-v1_5 with SHA-256 over arbitrary bytes
//! - [`payload`]: the provider's double base64 + AES-CFB payload envelope

pub mod payload;
pub mod signature;

pub use payload::{decrypt_payload, encrypt_payload, BLOCK_SIZE};
pub use signature::{sign, verify};

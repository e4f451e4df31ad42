// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Signature verification
//!
//! The provider signs tokens and notifications with RSASSA-PKCS1-v1_5 over a
//! SHA-256 digest. Signatures travel as URL-safe base64; the provider pads
//! notification signatures while token signatures are unpadded, so decoding
//! accepts both forms.
//!
//! [`verify`] is total: malformed input yields `false`, never an error.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use log::debug;
use rsa::sha2::{Digest, Sha256};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};

/// URL-safe alphabet, padding optional on decode, never emitted on encode
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Verify `signature_encoded` over `message` with the provider public key
///
/// # Returns
///
/// `true` only if the signature decodes and validates against the SHA-256
/// digest of `message`.
pub fn verify(message: &[u8], signature_encoded: &str, public_key: &RsaPublicKey) -> bool {
    let raw_signature = match URL_SAFE_LENIENT.decode(signature_encoded) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Signature is not valid URL-safe base64: {}", e);
            return false;
        }
    };

    let hashed = Sha256::digest(message);
    match public_key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, &raw_signature) {
        Ok(()) => true,
        Err(e) => {
            debug!("Signature verification failed: {}", e);
            false
        }
    }
}

/// Sign `message` the way the provider does
///
/// Returns the unpadded URL-safe base64 signature. Only needed by tooling
/// that stands in for the provider (see [`crate::utility::token_minter`]).
///
/// # Errors
///
/// Returns an error if the private key cannot produce a signature.
pub fn sign(message: &[u8], private_key: &RsaPrivateKey) -> Result<String, rsa::Error> {
    let hashed = Sha256::digest(message);
    let raw_signature = private_key.sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)?;
    Ok(URL_SAFE_LENIENT.encode(raw_signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;
    use std::sync::OnceLock;

    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            RsaPrivateKey::new(&mut rsa::rand_core::OsRng, 2048).expect("key generation")
        })
    }

    #[test]
    fn sign_then_verify() {
        let private_key = test_key();
        let public_key = RsaPublicKey::from(private_key);
        for message in [&b""[..], b"hello", b"{\"I\":\"id1\"}"] {
            let signature = sign(message, private_key).unwrap();
            assert!(verify(message, &signature, &public_key));
        }
    }

    #[test]
    fn padded_signature_is_accepted() {
        let private_key = test_key();
        let public_key = RsaPublicKey::from(private_key);
        let hashed = Sha256::digest(b"padded");
        let raw = private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
            .unwrap();
        assert!(verify(b"padded", &URL_SAFE.encode(raw), &public_key));
    }

    #[test]
    fn any_flipped_bit_is_rejected() {
        let private_key = test_key();
        let public_key = RsaPublicKey::from(private_key);
        let message = b"notification data";
        let signature = sign(message, private_key).unwrap();
        let raw = URL_SAFE_LENIENT.decode(&signature).unwrap();

        for bit in [0usize, 7, 8 * 17 + 3, raw.len() * 8 - 1] {
            let mut tampered = raw.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            assert!(!verify(
                message,
                &URL_SAFE_LENIENT.encode(&tampered),
                &public_key
            ));
        }
    }

    #[test]
    fn wrong_message_or_key_is_rejected() {
        let private_key = test_key();
        let public_key = RsaPublicKey::from(private_key);
        let signature = sign(b"original", private_key).unwrap();
        assert!(!verify(b"tampered", &signature, &public_key));

        let other = RsaPrivateKey::new(&mut rsa::rand_core::OsRng, 2048).unwrap();
        assert!(!verify(
            b"original",
            &signature,
            &RsaPublicKey::from(&other)
        ));
    }

    #[test]
    fn malformed_signature_is_false_not_error() {
        let public_key = RsaPublicKey::from(test_key());
        assert!(!verify(b"message", "", &public_key));
        assert!(!verify(b"message", "not base64 at all!", &public_key));
        assert!(!verify(b"message", "AAAA", &public_key));
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Payload envelope
//!
//! Identity payloads embedded in provider tokens use a double base64 framing
//! around AES in 128-bit cipher feedback mode:
//!
//! ```text
//! payload = base64( IV[16] || AES-CFB(key, IV, base64(json)) )
//! ```
//!
//! Both base64 layers use the standard padded alphabet. The AES variant is
//! selected by the key length: 16, 24 or 32 bytes for AES-128/192/256.

use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use cfb_mode::{Decryptor, Encryptor};

use crate::error::PayloadError;

/// AES block size, also the length of the IV prefix
pub const BLOCK_SIZE: usize = 16;

fn check_key_length(key: &[u8]) -> Result<(), PayloadError> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        len => Err(PayloadError::InvalidKeyLength { len }),
    }
}

fn cfb_decrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), PayloadError> {
    let invalid = |_| PayloadError::InvalidKeyLength { len: key.len() };
    match key.len() {
        16 => Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt(buf),
        24 => Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt(buf),
        32 => Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt(buf),
        len => return Err(PayloadError::InvalidKeyLength { len }),
    }
    Ok(())
}

fn cfb_encrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), PayloadError> {
    let invalid = |_| PayloadError::InvalidKeyLength { len: key.len() };
    match key.len() {
        16 => Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt(buf),
        24 => Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt(buf),
        32 => Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt(buf),
        len => return Err(PayloadError::InvalidKeyLength { len }),
    }
    Ok(())
}

/// Recover the plaintext identity JSON from a token `payload` claim
///
/// # Arguments
///
/// * `key` - The pre-shared payload key (16, 24 or 32 bytes)
/// * `payload_encoded` - The `payload` claim as found in the token
///
/// # Errors
///
/// * [`PayloadError::InvalidKeyLength`] if `key` is not an AES key size
/// * [`PayloadError::Decode`] if either base64 layer is malformed
/// * [`PayloadError::CiphertextTooShort`] if the decoded data cannot hold an IV
pub fn decrypt_payload(key: &[u8], payload_encoded: &str) -> Result<Vec<u8>, PayloadError> {
    check_key_length(key)?;

    let mut data = STANDARD.decode(payload_encoded)?;
    if data.len() < BLOCK_SIZE {
        return Err(PayloadError::CiphertextTooShort { len: data.len() });
    }

    let (iv, ciphertext) = data.split_at_mut(BLOCK_SIZE);
    cfb_decrypt(key, iv, ciphertext)?;

    Ok(STANDARD.decode(&data[BLOCK_SIZE..])?)
}

/// Build a `payload` claim from plaintext, using a fresh random IV
///
/// Inverse of [`decrypt_payload`].
pub fn encrypt_payload(key: &[u8], plaintext: &[u8]) -> Result<String, PayloadError> {
    check_key_length(key)?;

    let mut iv = [0u8; BLOCK_SIZE];
    getrandom::getrandom(&mut iv).map_err(|e| PayloadError::Encryption {
        reason: format!("IV generation failed: {}", e),
    })?;

    let mut body = STANDARD.encode(plaintext).into_bytes();
    cfb_encrypt(key, &iv, &mut body)?;

    let mut framed = Vec::with_capacity(BLOCK_SIZE + body.len());
    framed.extend_from_slice(&iv);
    framed.extend_from_slice(&body);
    Ok(STANDARD.encode(framed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: &[u8] = br#"{"I":"id1","N":"a@b.com","T":1,"A":[]}"#;

    #[test]
    fn round_trip_for_each_key_size() {
        for key in [
            &b"0123456789abcdef"[..],
            b"0123456789abcdef01234567",
            b"0123456789abcdef0123456789abcdef",
        ] {
            let payload = encrypt_payload(key, IDENTITY).unwrap();
            assert_eq!(decrypt_payload(key, &payload).unwrap(), IDENTITY);
        }
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = b"0123456789abcdef";
        let payload = encrypt_payload(key, b"").unwrap();
        assert!(decrypt_payload(key, &payload).unwrap().is_empty());
    }

    #[test]
    fn fresh_iv_per_encryption() {
        let key = b"0123456789abcdef";
        let first = encrypt_payload(key, IDENTITY).unwrap();
        let second = encrypt_payload(key, IDENTITY).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        let key = b"0123456789abcdef";
        let payload = STANDARD.encode([0u8; BLOCK_SIZE - 1]);
        let err = decrypt_payload(key, &payload).unwrap_err();
        assert!(matches!(err, PayloadError::CiphertextTooShort { len: 15 }));

        let err = decrypt_payload(key, "").unwrap_err();
        assert!(matches!(err, PayloadError::CiphertextTooShort { len: 0 }));
    }

    #[test]
    fn iv_only_decrypts_to_empty() {
        let key = b"0123456789abcdef";
        let payload = STANDARD.encode([7u8; BLOCK_SIZE]);
        assert!(decrypt_payload(key, &payload).unwrap().is_empty());
    }

    #[test]
    fn outer_base64_errors_propagate() {
        let err = decrypt_payload(b"0123456789abcdef", "%%%not-base64%%%").unwrap_err();
        assert!(matches!(err, PayloadError::Decode(_)));
    }

    #[test]
    fn wrong_key_fails_inner_decode() {
        let payload = encrypt_payload(b"0123456789abcdef", IDENTITY).unwrap();
        // A wrong key yields pseudo-random bytes, which are not base64
        let result = decrypt_payload(b"fedcba9876543210", &payload);
        assert!(result.map(|p| p != IDENTITY).unwrap_or(true));
    }

    #[test]
    fn invalid_key_length() {
        let err = decrypt_payload(b"short", "AAAA").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidKeyLength { len: 5 }));
        let err = encrypt_payload(&[0u8; 20], IDENTITY).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidKeyLength { len: 20 }));
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Fident development key generator
//!
//! Generates the key material of a local provider stand-in: an RSA key pair
//! (PKCS#1 PEM) and a random payload key.
//!
//! ## Usage
//!
//! ```text
//! fident_keygen [--out-pub-key keys/fident_public.pem] [--out-private-key keys/fident_private.pem]
//!               [--length 2048] [--payload-key-length 32]
//! ```
//!
//! The public key path and the payload key go in the `keys` section of the
//! configuration file; the private key is what
//! `fident_web::utility::TokenMinter` signs with.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

const PAYLOAD_KEY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Generate provider key material for local Fident development"
)]
struct Args {
    /// Output path for the public key PEM file (PKCS#1).
    #[clap(long, default_value = "keys/fident_public.pem")]
    out_pub_key: PathBuf,

    /// Output path for the private key PEM file (PKCS#1).
    #[clap(long, default_value = "keys/fident_private.pem")]
    out_private_key: PathBuf,

    /// RSA key length in bits.
    #[clap(long, default_value = "2048")]
    length: usize,

    /// Payload key length in bytes: 16, 24 or 32.
    #[clap(long, default_value = "32")]
    payload_key_length: usize,
}

/// Random alphanumeric key, so it can live in a YAML file as is
fn generate_payload_key(len: usize) -> Result<String> {
    // Largest multiple of the alphabet size that fits in a byte, to avoid modulo bias
    let limit = (256 / PAYLOAD_KEY_ALPHABET.len() * PAYLOAD_KEY_ALPHABET.len()) as u8;
    let mut key = String::with_capacity(len);
    let mut buf = [0u8; 64];
    while key.len() < len {
        getrandom::getrandom(&mut buf).map_err(|e| anyhow::anyhow!("Random source failed: {}", e))?;
        for byte in buf.iter().filter(|b| **b < limit) {
            if key.len() == len {
                break;
            }
            key.push(PAYLOAD_KEY_ALPHABET[*byte as usize % PAYLOAD_KEY_ALPHABET.len()] as char);
        }
    }
    Ok(key)
}

fn write_pem(path: &PathBuf, pem: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create key file at {:?}", path))?;
    file.write_all(pem.as_bytes())
        .with_context(|| format!("Failed to write key to {:?}", path))
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !matches!(args.payload_key_length, 16 | 24 | 32) {
        bail!(
            "--payload-key-length must be 16, 24 or 32, got {}",
            args.payload_key_length
        );
    }

    println!("Generating RSA key pair with {} bits...", args.length);

    let generating = Arc::new(AtomicBool::new(true));
    let generating_clone = generating.clone();
    let spinner_handle = thread::spawn(move || {
        let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut i = 0;
        while generating_clone.load(Ordering::Relaxed) {
            print!("\r{} Generating RSA key... ", spinner_chars[i]);
            io::stdout().flush().ok();
            i = (i + 1) % spinner_chars.len();
            thread::sleep(Duration::from_millis(100));
        }
        print!("\r                                  \r");
        io::stdout().flush().ok();
    });

    let key_result = RsaPrivateKey::new(&mut rsa::rand_core::OsRng, args.length);
    generating.store(false, Ordering::Relaxed);
    spinner_handle.join().ok();
    let private_key = key_result.context("Failed to generate RSA private key")?;

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .context("Failed to encode private key to PEM")?;
    let public_pem = RsaPublicKey::from(&private_key)
        .to_pkcs1_pem(LineEnding::LF)
        .context("Failed to encode public key to PEM")?;

    write_pem(&args.out_private_key, &private_pem)?;
    write_pem(&args.out_pub_key, &public_pem)?;

    let payload_key = generate_payload_key(args.payload_key_length)?;

    println!("Private key written to: {:?}", args.out_private_key);
    println!("Public key written to: {:?}", args.out_pub_key);
    println!();
    println!("Add to your configuration file:");
    println!("keys:");
    println!("  public_key_path: {}", args.out_pub_key.display());
    println!("  payload_key: {}", payload_key);

    Ok(())
}

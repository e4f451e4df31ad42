// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Auth-setter proxy
//!
//! Standalone server forwarding `/as` to the Fident token endpoint, for
//! applications that cannot mount the proxy route themselves.
//!
//! ```text
//! authsetter                           # production endpoint, port 80
//! authsetter --dev                     # http://localhost:7181, port 8088
//! authsetter -t https://auth.example -p 8080
//! authsetter -c fident.yaml            # settings from the `authset` section
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fident_web::config::Config;
use fident_web::web::{build_rocket, AuthsetProxy, FidentState};
use log::info;
use rocket::config::LogLevel;

/// Fident auth-setter reverse proxy
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Fident token endpoint to forward to
    #[arg(short = 't', long)]
    token_endpoint: Option<String>,

    /// Development mode: local token endpoint and port 8088, overriding -t and -p
    #[arg(short = 'd', long)]
    dev: bool,

    /// Address to listen on
    #[arg(short = 'a', long)]
    address: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// YAML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[rocket::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    config.apply_args(args.token_endpoint, args.address, args.port);
    if args.dev {
        config.apply_dev_mode();
    }
    config.validate()?;

    info!(
        "authsetter proxy {} forwarding to {}",
        env!("CARGO_PKG_VERSION"),
        config.authset.token_endpoint
    );
    println!(
        "Auth-setter proxy listening on {}:{}",
        config.authset.address, config.authset.port
    );

    let figment = rocket::Config::figment()
        .merge((
            "ident",
            format!("FidentAuthsetter/{}", env!("CARGO_PKG_VERSION")),
        ))
        .merge(("address", config.authset.address.clone()))
        .merge(("port", config.authset.port))
        .merge(("log_level", LogLevel::Normal));

    let state = FidentState::new().with_authset(AuthsetProxy::new(&config.authset.token_endpoint)?);
    let _rocket = build_rocket(figment, state).launch().await?;

    Ok(())
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fident-web project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use fident_web::config::{authset, Config};
use fident_web::NotificationScheme;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

#[test]
fn test_missing_config_file_is_created_with_defaults() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let config = Config::from_file(&config_path)?;
    assert!(config_path.exists(), "Default config file was not written");
    assert_eq!(config.authset.token_endpoint, authset::DEFAULT_TOKEN_ENDPOINT);
    assert_eq!(config.notifications.path, "/fident/notify");
    assert_eq!(config.notifications.scheme, NotificationScheme::OpaqueEnvelope);
    assert!(config.keys.payload_key.is_none());

    // The written file loads back to the same values
    let reloaded = Config::from_file(&config_path)?;
    assert_eq!(reloaded.authset.port, config.authset.port);
    assert_eq!(reloaded.urls.provider_url, config.urls.provider_url);

    Ok(())
}

#[test]
fn test_partial_config_uses_defaults() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    fs::write(
        &config_path,
        r#"
keys:
  payload_key: "0123456789abcdef0123456789abcdef"
notifications:
  scheme: field_concatenation
"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(
        config.keys.payload_key.as_deref(),
        Some("0123456789abcdef0123456789abcdef")
    );
    assert_eq!(config.keys.public_key_path, "keys/fident_public.pem");
    assert_eq!(
        config.notifications.scheme,
        NotificationScheme::FieldConcatenation
    );
    assert!(config.notifications.enabled);
    assert_eq!(config.notifications.max_body, 1024 * 1024);
    assert_eq!(config.authset.address, "0.0.0.0");

    Ok(())
}

#[test]
fn test_config_deserialization_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Valid YAML, wrong structure
    let invalid_yaml = r#"
authset:
  port: "not-an-integer"
notifications:
  enabled: "sometimes"
  scheme: carrier_pigeon
"#;
    fs::write(&config_path, invalid_yaml)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    // The broken file is left alone
    assert_eq!(fs::read_to_string(&config_path)?, invalid_yaml);

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(
        Path::new(&sample_path).exists(),
        "Sample config file was not created"
    );

    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config.authset.port, 80);

    Ok(())
}

#[test]
fn test_config_validation_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;

    let cases = [
        (
            "bad_payload_key.yaml",
            "keys:\n  payload_key: \"too-short\"\n",
        ),
        (
            "bad_provider_url.yaml",
            "urls:\n  provider_url: \"ftp://fident.io\"\n",
        ),
        (
            "bad_notification_path.yaml",
            "notifications:\n  path: \"fident/notify\"\n",
        ),
        ("bad_port.yaml", "authset:\n  port: 0\n"),
        ("bad_max_body.yaml", "notifications:\n  max_body: 0\n"),
        ("bad_address.yaml", "authset:\n  address: \"not-an-ip\"\n"),
        (
            "empty_secret.yaml",
            "urls:\n  registration_secret: \"\"\n",
        ),
    ];

    for (name, contents) in cases {
        let config_path = temp_dir.path().join(name);
        fs::write(&config_path, contents)?;

        let result = Config::from_file(&config_path);
        assert!(result.is_err(), "{} should fail validation", name);

        let sample_path = config_path.with_extension("sample.yaml");
        assert!(
            sample_path.exists(),
            "Sample config file was not created for {}",
            name
        );
    }

    Ok(())
}

#[test]
fn test_save_and_reload() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("saved.yaml");

    let mut config = Config::default();
    config.urls.product_url = "https://app.example.com".to_string();
    config.urls.registration_secret = Some("80211BZH0T2V1LBBZNXV".to_string());
    config.apply_args(Some(authset::DEV_TOKEN_ENDPOINT.to_string()), None, Some(8088));
    config.validate()?;
    config.save_to_file(&config_path)?;

    let reloaded = Config::from_file(&config_path)?;
    assert_eq!(reloaded.urls.product_url, "https://app.example.com");
    assert_eq!(
        reloaded.urls.registration_secret.as_deref(),
        Some("80211BZH0T2V1LBBZNXV")
    );
    assert_eq!(reloaded.authset.token_endpoint, authset::DEV_TOKEN_ENDPOINT);
    assert_eq!(reloaded.authset.port, 8088);
    assert_eq!(reloaded.authset.address, "0.0.0.0");

    Ok(())
}

#[test]
fn test_dev_mode_overrides_endpoint_and_port() -> Result<()> {
    setup();
    let mut config = Config::default();
    config.apply_args(
        Some("https://auth.example.com".to_string()),
        Some("127.0.0.1".to_string()),
        Some(9000),
    );
    config.apply_dev_mode();
    config.validate()?;

    assert_eq!(config.authset.token_endpoint, authset::DEV_TOKEN_ENDPOINT);
    assert_eq!(config.authset.port, authset::DEV_PORT);
    assert_eq!(config.authset.address, "127.0.0.1");

    Ok(())
}

use std::ffi::OsString;
use std::fs;

use tempfile::TempDir;
use cuebridge_config::Config;

#[test]
fn malformed_config_file_is_reported() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("cuebridge.toml");
    fs::write(
        &path,
        r#"listen_socket = { transport = "tcp" host = "127.0.0.1" }"#,
    )
    .expect("write malformed config");

    let args = vec![
        OsString::from("cuebridged"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(!error.to_string().is_empty());
}

#[test]
fn mistyped_auth_flag_is_reported() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("cuebridge.toml");
    fs::write(&path, "auth_required = \"sometimes\"\n").expect("write mistyped config");

    let args = vec![
        OsString::from("cuebridged"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    assert!(Config::load_from_iter(args).is_err());
}

#[test]
fn secret_from_file_is_loaded() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("cuebridge.toml");
    fs::write(&path, "auth_required = true\nauth_secret = \"hunter2\"\n")
        .expect("write config");

    let args = vec![
        OsString::from("cuebridged"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let config = Config::load_from_iter(args).expect("load config");
    assert!(config.auth_required());
    assert_eq!(config.auth_secret(), Some("hunter2"));
    assert!(config.validate().is_ok());
}

#[test]
fn unrelated_flags_keep_auth_from_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("cuebridge.toml");
    fs::write(&path, "auth_required = true\nauth_secret = \"s\"\n").expect("write config");

    let args = vec![
        OsString::from("cuebridged"),
        OsString::from("--config-path"),
        path.into_os_string(),
        OsString::from("--log-filter"),
        OsString::from("debug"),
    ];

    let config = Config::load_from_iter(args).expect("load config");
    assert!(config.auth_required());
    assert_eq!(config.log_filter(), "debug");
}

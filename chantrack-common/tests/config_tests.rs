//! Configuration loading from the process environment and TOML files
//!
//! Uses serial_test: these tests mutate process-wide environment variables.

use chantrack_common::config::{
    ServiceConfig, CONFIG_FILE_ENV, GOOGLE_CLIENT_ID_ENV, LOG_LEVEL_ENV, PORT_ENV,
    YOUTUBE_API_KEY_ENV,
};
use chantrack_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_env() {
    for key in [
        CONFIG_FILE_ENV,
        GOOGLE_CLIENT_ID_ENV,
        YOUTUBE_API_KEY_ENV,
        PORT_ENV,
        LOG_LEVEL_ENV,
    ] {
        env::remove_var(key);
    }
}

fn write_toml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_from_explicit_toml_file() {
    clear_env();
    let file = write_toml(
        r#"
        port = 8081
        google_client_id = "client-from-toml"
        youtube_api_key = "key-from-toml"

        [logging]
        level = "debug"
        "#,
    );
    env::set_var(CONFIG_FILE_ENV, file.path());

    let config = ServiceConfig::load().unwrap();

    assert_eq!(config.port, 8081);
    assert_eq!(config.google_client_id, "client-from-toml");
    assert_eq!(config.youtube_api_key, "key-from-toml");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.config_file.as_deref(), Some(file.path()));

    clear_env();
}

#[test]
#[serial]
fn test_env_beats_toml_file() {
    clear_env();
    let file = write_toml(
        r#"
        port = 8081
        google_client_id = "client-from-toml"
        youtube_api_key = "key-from-toml"
        "#,
    );
    env::set_var(CONFIG_FILE_ENV, file.path());
    env::set_var(PORT_ENV, "9090");
    env::set_var(YOUTUBE_API_KEY_ENV, "key-from-env");

    let config = ServiceConfig::load().unwrap();

    assert_eq!(config.port, 9090);
    assert_eq!(config.youtube_api_key, "key-from-env");
    assert_eq!(config.google_client_id, "client-from-toml");

    clear_env();
}

#[test]
#[serial]
fn test_malformed_toml_is_config_error() {
    clear_env();
    let file = write_toml("port = \"not a number\"\n[[[");
    env::set_var(CONFIG_FILE_ENV, file.path());

    let result = ServiceConfig::load();
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_toml_is_config_error() {
    clear_env();
    env::set_var(CONFIG_FILE_ENV, "/nonexistent/chantrack/config.toml");
    env::set_var(GOOGLE_CLIENT_ID_ENV, "client");
    env::set_var(YOUTUBE_API_KEY_ENV, "key");

    let result = ServiceConfig::load();
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

//! Tests for loading relay configuration from files.

use std::io::Write;
use tictactoe_relay::RelayConfig;

#[test]
fn test_from_file_fills_missing_keys_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 9100").unwrap();

    let config = RelayConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.port(), 9100);
    assert_eq!(config.host(), "0.0.0.0");
}

#[test]
fn test_from_file_reads_host() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "host = \"127.0.0.1\"\nport = 3000").unwrap();

    let config = RelayConfig::from_file(file.path()).unwrap();
    assert_eq!(config, RelayConfig::new("127.0.0.1", 3000));
}

#[test]
fn test_from_file_rejects_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let err = RelayConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_missing_file_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = RelayConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use remote_relay::cli::parse_args_from;
use remote_relay::config::Config;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("remote-relay")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.host.is_none());
    assert!(result.user.is_none());
    assert!(result.config.is_none());
    assert!(result.commands.is_empty());
    assert!(!result.no_capture_stderr);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-H",
        "lab04",
        "-u",
        "tai",
        "-p",
        "2200",
        "-i",
        "/keys/id_ed25519",
        "-l",
        "debug",
        "--no-capture-stderr",
        "uname -a",
        "uptime",
    ]))
    .unwrap();

    assert_eq!(result.host.as_deref(), Some("lab04"));
    assert_eq!(result.user.as_deref(), Some("tai"));
    assert_eq!(result.port, Some(2200));
    assert_eq!(result.log_level.as_deref(), Some("debug"));
    assert!(result.no_capture_stderr);
    assert_eq!(result.commands, vec!["uname -a", "uptime"]);
}

#[test]
fn test_cli_transfer_options() {
    let result = parse_args_from(args(&[
        "-H",
        "lab04",
        "--get",
        "/media/nas/output",
        "-d",
        "./clips",
        "-r",
        "--preserve-times",
    ]))
    .unwrap();

    assert_eq!(result.get.as_deref(), Some("/media/nas/output"));
    assert_eq!(result.dest.as_deref(), Some("./clips"));
    assert!(result.recursive);
    assert!(result.preserve_times);
}

#[test]
fn test_cli_invalid_port() {
    let result = parse_args_from(args(&["-p", "not-a-number"]));
    assert!(result.is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "remote": {
            "host": "lab04",
            "port": 2200,
            "username": "tai",
            "identity_file": "/keys/id_lab"
        },
        "execution": {
            "wait_timeout_secs": 3,
            "capture_stderr": false
        },
        "logging": {
            "level": "debug"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let parsed = parse_args_from(args(&["-c", file.path().to_str().unwrap()])).unwrap();
    let config = Config::load(&parsed).unwrap();

    assert_eq!(config.remote.host, "lab04");
    assert_eq!(config.remote.port, 2200);
    assert_eq!(config.remote.username, "tai");
    assert_eq!(config.execution.wait_timeout_secs, 3);
    assert!(!config.execution.capture_stderr);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_cli_overrides_config_file() {
    let json = r#"{
        "remote": { "host": "from-file", "username": "file-user", "port": 22 }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let parsed = parse_args_from(args(&[
        "-c",
        file.path().to_str().unwrap(),
        "-H",
        "from-cli",
        "-p",
        "2222",
    ]))
    .unwrap();
    let config = Config::load(&parsed).unwrap();

    // CLI arguments take priority over the file.
    assert_eq!(config.remote.host, "from-cli");
    assert_eq!(config.remote.port, 2222);
    // Untouched fields keep file values.
    assert_eq!(config.remote.username, "file-user");
}

#[test]
fn test_config_missing_file_is_error() {
    let parsed = parse_args_from(args(&["-c", "/nonexistent/config.json"])).unwrap();
    assert!(Config::load(&parsed).is_err());
}

#[test]
fn test_config_to_remote_config_roundtrip() {
    let parsed = parse_args_from(args(&["-H", "lab04", "-u", "tai", "-p", "2200"])).unwrap();
    let config = Config::load(&parsed).unwrap();
    let remote = config.to_remote_config().unwrap();

    assert_eq!(remote.host, "lab04");
    assert_eq!(remote.username, "tai");
    assert_eq!(remote.port, 2200);
}

#[test]
fn test_config_rejects_missing_host() {
    let parsed = parse_args_from(args(&["-u", "tai"])).unwrap();
    let config = Config::load(&parsed).unwrap();
    assert!(config.to_remote_config().is_err());
}

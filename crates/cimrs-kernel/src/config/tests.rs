//! Loader tests across formats, env substitution and env overlay.

use super::*;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct ListenConfig {
    server: ServerSection,
    fixture: Option<FixtureSection>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ServerSection {
    host: String,
    port: u16,
    root: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct FixtureSection {
    path: String,
}

fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let path = dir.path().join(filename);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn detect_format_from_extension() {
    assert_eq!(detect_format("gateway.yaml").unwrap(), FileFormat::Yaml);
    assert_eq!(detect_format("gateway.yml").unwrap(), FileFormat::Yaml);
    assert_eq!(detect_format("gateway.toml").unwrap(), FileFormat::Toml);
    assert_eq!(detect_format("gateway.json").unwrap(), FileFormat::Json);

    assert!(matches!(
        detect_format("gateway.ini"),
        Err(ConfigError::UnsupportedFormat(_))
    ));
    assert!(detect_format("gateway").is_err());
}

#[test]
fn all_formats_load_the_same_config() {
    let temp_dir = TempDir::new().unwrap();

    let yaml = r#"
server:
  host: 127.0.0.1
  port: 5988
  root: cimrs
"#;
    let toml = r#"
[server]
host = "127.0.0.1"
port = 5988
root = "cimrs"
"#;
    let json = r#"{ "server": { "host": "127.0.0.1", "port": 5988, "root": "cimrs" } }"#;

    for (name, body) in [("gw.yml", yaml), ("gw.toml", toml), ("gw.json", json)] {
        let path = create_test_file(&temp_dir, name, body);
        let config: ListenConfig = load_config(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1", "{name}");
        assert_eq!(config.server.port, 5988, "{name}");
        assert_eq!(config.server.root.as_deref(), Some("cimrs"), "{name}");
        assert!(config.fixture.is_none());
    }
}

#[test]
fn braced_env_var_is_substituted() {
    let temp_dir = TempDir::new().unwrap();
    unsafe { std::env::set_var("CIMRS_TEST_FIXTURE_DIR", "/srv/fixtures"); }

    let toml = r#"
[server]
host = "0.0.0.0"
port = 5988

[fixture]
path = "${CIMRS_TEST_FIXTURE_DIR}/provider.json"
"#;
    let path = create_test_file(&temp_dir, "gw.toml", toml);
    let config: ListenConfig = load_config(&path).unwrap();
    assert_eq!(config.fixture.unwrap().path, "/srv/fixtures/provider.json");

    unsafe { std::env::remove_var("CIMRS_TEST_FIXTURE_DIR"); }
}

#[test]
fn unbraced_env_var_is_substituted() {
    unsafe { std::env::set_var("CIMRS_TEST_HOST", "gateway.local"); }

    let yaml = r#"
server:
  host: $CIMRS_TEST_HOST
  port: 80
"#;
    let config: ListenConfig = from_str(yaml, FileFormat::Yaml).unwrap();
    assert_eq!(config.server.host, "gateway.local");

    unsafe { std::env::remove_var("CIMRS_TEST_HOST"); }
}

#[test]
fn missing_env_var_is_preserved() {
    assert_eq!(
        substitute_env_vars("path: ${CIMRS_TEST_DEFINITELY_UNSET}"),
        "path: ${CIMRS_TEST_DEFINITELY_UNSET}"
    );
    assert_eq!(
        substitute_env_vars("path: $CIMRS_TEST_ALSO_UNSET"),
        "path: $CIMRS_TEST_ALSO_UNSET"
    );
}

#[test]
fn env_overlay_overrides_nested_file_values() {
    let temp_dir = TempDir::new().unwrap();
    unsafe { std::env::set_var("CIMRSOVL_SERVER__PORT", "6000"); }

    let yaml = r#"
server:
  host: 127.0.0.1
  port: 5988
"#;
    let path = create_test_file(&temp_dir, "gw.yaml", yaml);
    let config: ListenConfig = load_with_env(&path, "CIMRSOVL").unwrap();
    assert_eq!(config.server.port, 6000);
    assert_eq!(config.server.host, "127.0.0.1");

    unsafe { std::env::remove_var("CIMRSOVL_SERVER__PORT"); }
}

#[test]
fn missing_file_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");
    let err = load_config::<ListenConfig>(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn wrong_shape_is_a_serialization_error() {
    let json = r#"{ "server": { "host": "h", "port": "not-a-port" } }"#;
    let err = from_str::<ListenConfig>(json, FileFormat::Json).unwrap_err();
    assert!(matches!(err, ConfigError::Serialization(_)));
}

#[test]
fn read_source_returns_substituted_text() {
    let temp_dir = TempDir::new().unwrap();
    unsafe { std::env::set_var("CIMRS_TEST_NS", "test/TestProvider"); }

    let path = create_test_file(&temp_dir, "fixture.json", r#"{"ns": "${CIMRS_TEST_NS}"}"#);
    let (text, format) = read_source(&path).unwrap();
    assert_eq!(format, FileFormat::Json);
    assert_eq!(text, r#"{"ns": "test/TestProvider"}"#);

    unsafe { std::env::remove_var("CIMRS_TEST_NS"); }
}

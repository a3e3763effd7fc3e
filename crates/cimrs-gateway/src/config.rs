//! Gateway server configuration.

use cimrs_kernel::config::{self, ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override file settings
/// (`CIMRS_PORT`, `CIMRS_ROOT`, ...).
pub const ENV_PREFIX: &str = "CIMRS";

/// Runtime configuration for [`GatewayServer`](crate::server::GatewayServer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayServerConfig {
    /// Interface to bind (default: `0.0.0.0`).
    pub bind_address: String,
    /// TCP port (default: 5988).
    pub port: u16,
    /// First path segment of every resource URI (default: `cimrs`).
    pub root: String,
    /// Fixture document to seed the in-memory repository from.
    pub repository_path: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for GatewayServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5988,
            root: crate::address::DEFAULT_ROOT.to_string(),
            repository_path: None,
            log_filter: "cimrs_gateway=info".to_string(),
        }
    }
}

impl GatewayServerConfig {
    /// Load from a TOML/YAML/JSON file, then apply `CIMRS_*` overrides.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config: Self = config::load_with_env(path, ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus `CIMRS_*` overrides, for running without a file.
    pub fn from_env() -> ConfigResult<Self> {
        let config: Self = config::from_env(ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be greater than 0".to_string()));
        }
        if self.root.trim().is_empty() {
            return Err(ConfigError::Invalid("root segment cannot be empty".to_string()));
        }
        if self.root.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "root segment '{}' must not contain '/'",
                self.root
            )));
        }
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address cannot be empty".to_string()));
        }
        Ok(())
    }

    /// `bind_address:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = GatewayServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr(), "0.0.0.0:5988");
        assert_eq!(config.root, "cimrs");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let zero_port = GatewayServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(zero_port.validate(), Err(ConfigError::Invalid(_))));

        let nested_root = GatewayServerConfig {
            root: "cim/rs".into(),
            ..Default::default()
        };
        assert!(nested_root.validate().is_err());

        let empty_root = GatewayServerConfig {
            root: " ".into(),
            ..Default::default()
        };
        assert!(empty_root.validate().is_err());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gateway.toml");
        fs::write(
            &path,
            "port = 15988\nrepository_path = \"fixtures/test_provider.json\"\n",
        )
        .unwrap();

        let config = GatewayServerConfig::load(&path).unwrap();
        assert_eq!(config.port, 15988);
        assert_eq!(config.root, "cimrs");
        assert_eq!(
            config.repository_path.as_deref(),
            Some(Path::new("fixtures/test_provider.json"))
        );
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gateway.yaml");
        fs::write(&path, "root: a/b\n").unwrap();
        assert!(matches!(
            GatewayServerConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}

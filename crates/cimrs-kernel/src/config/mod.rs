//! Configuration loading.
//!
//! Gateway settings and repository fixtures can be written as TOML, YAML or
//! JSON. The format is picked from the file extension, `${VAR}` / `$VAR`
//! references are substituted from the environment before parsing, and
//! [`load_with_env`] overlays prefixed environment variables on top.

use config::builder::DefaultState;
use config::{Config as Cfg, ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;

pub use config::FileFormat as Format;

static BRACED_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
static SIMPLE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document parsed but its values are out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Detect the configuration format from a file extension.
///
/// `.toml`, `.yaml` / `.yml` and `.json` are recognised (case-insensitive).
///
/// ```rust
/// use cimrs_kernel::config::{detect_format, Format};
///
/// assert_eq!(detect_format("gateway.TOML").unwrap(), Format::Toml);
/// assert!(detect_format("gateway.xml").is_err());
/// ```
pub fn detect_format(path: impl AsRef<Path>) -> ConfigResult<FileFormat> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Replace `${VAR}` and `$VAR` with the value of the environment variable.
///
/// References to unset variables are left as written.
pub fn substitute_env_vars(content: &str) -> String {
    // Braced first so `${A}B` is not read as `$A` followed by `}B`.
    let braced = BRACED_VAR.replace_all(content, env_value);
    SIMPLE_VAR.replace_all(&braced, env_value).into_owned()
}

fn env_value(caps: &regex::Captures<'_>) -> String {
    std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
}

/// Read a file, detect its format and substitute environment references.
///
/// Returns the substituted text and its format without deserializing it.
pub fn read_source(path: impl AsRef<Path>) -> ConfigResult<(String, FileFormat)> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    Ok((substitute_env_vars(&content), format))
}

/// Load a configuration file into `T`.
///
/// ```rust,ignore
/// #[derive(serde::Deserialize)]
/// struct Listen { port: u16 }
///
/// let listen: Listen = cimrs_kernel::config::load_config("gateway.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let (content, format) = read_source(path)?;
    deserialize(Cfg::builder().add_source(File::from_str(&content, format)))
}

/// Parse configuration text of an explicit format into `T`.
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let content = substitute_env_vars(content);
    deserialize(Cfg::builder().add_source(File::from_str(&content, format)))
}

/// Load a configuration file and overlay environment variables.
///
/// Variables are named `<PREFIX>_<KEY>`, with `__` separating nested keys:
/// for prefix `CIMRS`, `CIMRS_PORT` sets `port` and `CIMRS_TLS__CERT` would
/// set `tls.cert`. Values that look like numbers or booleans are parsed as
/// such.
pub fn load_with_env<T>(path: impl AsRef<Path>, env_prefix: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let (content, format) = read_source(path)?;
    deserialize(
        Cfg::builder()
            .add_source(File::from_str(&content, format))
            .add_source(env_source(env_prefix)),
    )
}

/// Build `T` from its serde defaults plus prefixed environment variables.
pub fn from_env<T>(env_prefix: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    deserialize(Cfg::builder().add_source(env_source(env_prefix)))
}

fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn deserialize<T>(builder: ConfigBuilder<DefaultState>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let config = builder
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests;

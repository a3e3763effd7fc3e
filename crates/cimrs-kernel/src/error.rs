//! Crate-level error types for `cimrs-kernel`.
//!
//! [`KernelError`] composes the errors of every sub-module (repository,
//! config, IO, serialization) and is carried in an [`error_stack::Report`]
//! so callers can attach context while the error propagates.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cimrs_kernel::error::{KernelError, KernelResult};
//! use error_stack::ResultExt;
//!
//! fn read_fixture(path: &str) -> KernelResult<String> {
//!     let text = std::fs::read_to_string(path)
//!         .map_err(KernelError::from)
//!         .map_err(error_stack::Report::new)
//!         .attach(format!("reading fixture {path}"))?;
//!     Ok(text)
//! }
//! ```

use crate::repository::RepositoryError;
use thiserror::Error;

/// Crate-level error type for `cimrs-kernel`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// An error reported by a repository.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// A configuration-related error (requires the `config` feature).
    #[cfg(feature = "config")]
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

/// `Result<T, error_stack::Report<KernelError>>`.
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;

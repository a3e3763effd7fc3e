//! Repository collaborator contract.
//!
//! The gateway never stores classes or instances itself. Every request is
//! answered from a [`Repository`] implementation injected at startup
//! (`cimrs-gateway` ships an in-memory one for tests and local serving).

use crate::model::{ClassName, ClassSchema, Instance, KeyBindings, Namespace};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Lookup failures reported by a repository.
///
/// The first three variants describe absence and map to "not found" at the
/// HTTP layer; [`Failed`](RepositoryError::Failed) is a fault inside the
/// repository itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RepositoryError {
    /// The namespace does not exist.
    #[error("namespace '{0}' does not exist")]
    InvalidNamespace(String),

    /// The class does not exist in the namespace.
    #[error("class '{class}' does not exist in namespace '{namespace}'")]
    InvalidClass { namespace: String, class: String },

    /// No instance of the class carries the requested key.
    #[error("no instance of '{class}' with key {key}")]
    NotFound { class: String, key: String },

    /// The repository could not complete the lookup.
    #[error("repository failure: {0}")]
    Failed(String),
}

impl RepositoryError {
    /// `true` for the absence variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::InvalidNamespace(_)
                | RepositoryError::InvalidClass { .. }
                | RepositoryError::NotFound { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository trait
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only lookup interface over classes and instances.
///
/// Calls are synchronous and return owned snapshots. Implementations must be
/// safe to share across request tasks.
pub trait Repository: Send + Sync {
    /// Class definition with the full propagated property set.
    fn get_class_schema(
        &self,
        namespace: &Namespace,
        class: &ClassName,
    ) -> Result<ClassSchema, RepositoryError>;

    /// Instances created directly on `class`, in insertion order.
    fn list_instances(
        &self,
        namespace: &Namespace,
        class: &ClassName,
    ) -> Result<Vec<Instance>, RepositoryError>;

    /// The instance of `class` identified by `keys`.
    fn get_instance(
        &self,
        namespace: &Namespace,
        class: &ClassName,
        keys: &KeyBindings,
    ) -> Result<Instance, RepositoryError>;

    /// Direct subclasses of `class`.
    ///
    /// Repositories without an inheritance index may keep the default, which
    /// reports none.
    fn list_subclass_names(
        &self,
        _namespace: &Namespace,
        _class: &ClassName,
    ) -> Result<Vec<ClassName>, RepositoryError> {
        Ok(Vec::new())
    }
}

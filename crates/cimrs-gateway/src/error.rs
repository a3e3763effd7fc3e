//! Gateway error types

use crate::address::AddressError;
use crate::types::TypeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cimrs_kernel::RepositoryError;
use thiserror::Error;

/// CIM operation status codes carried in error documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CimStatus {
    Failed,
    InvalidNamespace,
    InvalidParameter,
    InvalidClass,
    NotFound,
    NotSupported,
}

impl CimStatus {
    pub fn code(self) -> u32 {
        match self {
            CimStatus::Failed => 1,
            CimStatus::InvalidNamespace => 3,
            CimStatus::InvalidParameter => 4,
            CimStatus::InvalidClass => 5,
            CimStatus::NotFound => 6,
            CimStatus::NotSupported => 7,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CimStatus::Failed => "CIM_ERR_FAILED",
            CimStatus::InvalidNamespace => "CIM_ERR_INVALID_NAMESPACE",
            CimStatus::InvalidParameter => "CIM_ERR_INVALID_PARAMETER",
            CimStatus::InvalidClass => "CIM_ERR_INVALID_CLASS",
            CimStatus::NotFound => "CIM_ERR_NOT_FOUND",
            CimStatus::NotSupported => "CIM_ERR_NOT_SUPPORTED",
        }
    }
}

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    Address(#[from] AddressError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method {0} is not supported")]
    MethodNotAllowed(String),

    /// A stored value could not be represented.
    #[error("representation error: {0}")]
    Type(#[from] TypeError),
}

impl GatewayError {
    /// HTTP status and CIM status for this error.
    pub fn status(&self) -> (StatusCode, CimStatus) {
        match self {
            GatewayError::Address(_) => (StatusCode::BAD_REQUEST, CimStatus::InvalidParameter),
            GatewayError::Repository(e) => match e {
                RepositoryError::InvalidNamespace(_) => {
                    (StatusCode::NOT_FOUND, CimStatus::InvalidNamespace)
                }
                RepositoryError::InvalidClass { .. } => {
                    (StatusCode::NOT_FOUND, CimStatus::InvalidClass)
                }
                RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, CimStatus::NotFound),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, CimStatus::Failed),
            },
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, CimStatus::NotFound),
            GatewayError::MethodNotAllowed(_) => {
                (StatusCode::METHOD_NOT_ALLOWED, CimStatus::NotSupported)
            }
            GatewayError::Type(_) => (StatusCode::INTERNAL_SERVER_ERROR, CimStatus::Failed),
        }
    }
}

impl IntoResponse for GatewayError {
    /// Error document without request context. Handlers that know the
    /// request URI use [`crate::response::emit_error`] instead.
    fn into_response(self) -> Response {
        crate::response::emit_error(&self, None, "GET").into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_absence_maps_to_not_found_statuses() {
        let cases = [
            (RepositoryError::InvalidNamespace("x".into()), CimStatus::InvalidNamespace),
            (
                RepositoryError::InvalidClass {
                    namespace: "n".into(),
                    class: "c".into(),
                },
                CimStatus::InvalidClass,
            ),
            (
                RepositoryError::NotFound {
                    class: "c".into(),
                    key: "k".into(),
                },
                CimStatus::NotFound,
            ),
        ];
        for (err, cim) in cases {
            assert_eq!(GatewayError::from(err).status(), (StatusCode::NOT_FOUND, cim));
        }
    }

    #[test]
    fn faults_map_to_500_and_bad_addresses_to_400() {
        let failed = GatewayError::from(RepositoryError::Failed("io".into()));
        assert_eq!(failed.status(), (StatusCode::INTERNAL_SERVER_ERROR, CimStatus::Failed));

        let bad = GatewayError::from(AddressError::EmptySegment);
        assert_eq!(bad.status().0, StatusCode::BAD_REQUEST);
        assert_eq!(bad.status().1.code(), 4);

        let unrenderable = GatewayError::from(TypeError::NotScalar("null".into()));
        assert_eq!(unrenderable.status().1, CimStatus::Failed);

        let range = GatewayError::from(AddressError::InvalidRange("items=5-2".into()));
        assert_eq!(range.status().0, StatusCode::BAD_REQUEST);

        let method = GatewayError::MethodNotAllowed("POST".into());
        assert_eq!(method.status().0, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(method.status().1.description(), "CIM_ERR_NOT_SUPPORTED");
    }
}

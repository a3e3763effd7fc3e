//! Response emitter.
//!
//! Turns a JSON document (or a [`GatewayError`]) into an HTTP response with
//! `Content-type: application/json` and a compact body.

use crate::error::GatewayError;
use crate::resolver::ContentRange;
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// Methods served on every resource.
pub const ALLOWED_METHODS: &str = "GET, OPTIONS";

const APPLICATION_JSON: &str = "application/json";

/// A JSON body plus status, ready to be written to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => {
                let mut response = Response::new(Body::from(bytes));
                *response.status_mut() = self.status;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(APPLICATION_JSON),
                );
                response
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Successful document with the given status.
pub fn emit(document: Value, status: StatusCode) -> JsonResponse {
    JsonResponse {
        status,
        body: document,
    }
}

/// Error document for `err`.
///
/// ```json
/// {"kind":"errorresponse","self":"/cimrs/ns/C/9","httpmethod":"GET",
///  "statuscode":6,"statusdescription":"CIM_ERR_NOT_FOUND",
///  "message":"...","errors":[]}
/// ```
pub fn emit_error(err: &GatewayError, self_uri: Option<&str>, method: &str) -> JsonResponse {
    let (status, cim) = err.status();
    JsonResponse {
        status,
        body: json!({
            "kind": "errorresponse",
            "self": self_uri,
            "httpmethod": method,
            "statuscode": cim.code(),
            "statusdescription": cim.description(),
            "message": err.to_string(),
            "errors": [],
        }),
    }
}

/// `206 Partial Content` for a ranged collection read, with `Content-Range`.
pub fn emit_partial(document: Value, range: &ContentRange) -> Response {
    let mut response = emit(document, StatusCode::PARTIAL_CONTENT).into_response();
    if let Ok(value) = HeaderValue::from_str(&range.header_value()) {
        response.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    response
}

/// `200 OK` with `Allow: GET, OPTIONS` and an empty body.
pub fn options_response() -> Response {
    (
        StatusCode::OK,
        [(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressError;
    use cimrs_kernel::RepositoryError;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn success_is_compact_json() {
        let response = emit(json!([{"theKey": 1, "$ref": "1"}]), StatusCode::OK).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_string(response).await;
        assert!(body.starts_with('[') && body.ends_with(']'));
        assert!(!body.contains(' ') && !body.contains('\n'));
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, json!([{"theKey": 1, "$ref": "1"}]));
    }

    #[tokio::test]
    async fn partial_collection_has_content_range() {
        let range = ContentRange {
            served: Some((0, 0)),
            total: 3,
        };
        let response = emit_partial(json!([{"theKey": 1, "$ref": "1"}]), &range);
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers().get(header::CONTENT_RANGE).unwrap(), "items 0-0/3");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn error_document_carries_cim_status() {
        let err = GatewayError::from(RepositoryError::NotFound {
            class: "C".into(),
            key: "Id=Uint8(9)".into(),
        });
        let response = emit_error(&err, Some("/cimrs/ns/C/9"), "GET").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let doc: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(doc["kind"], "errorresponse");
        assert_eq!(doc["self"], "/cimrs/ns/C/9");
        assert_eq!(doc["httpmethod"], "GET");
        assert_eq!(doc["statuscode"], 6);
        assert_eq!(doc["statusdescription"], "CIM_ERR_NOT_FOUND");
        assert!(doc["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_error_into_response_has_null_self() {
        let response = GatewayError::from(AddressError::EmptySegment).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let doc: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(doc["self"].is_null());
        assert_eq!(doc["statuscode"], 4);
    }

    #[tokio::test]
    async fn options_advertises_allowed_methods() {
        let response = options_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, OPTIONS");
        assert!(body_string(response).await.is_empty());
    }
}

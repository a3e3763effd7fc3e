//! Axum-based HTTP gateway server.
//!
//! [`GatewayServer`] wires the addressor, resolver, representation builder
//! and response emitter into an axum service over a shared [`Repository`].
//!
//! # Endpoints
//!
//! | Method    | Path | Description |
//! |-----------|------|-------------|
//! | `GET`     | `/health` | Liveness check, always `200 OK`. |
//! | `GET`     | `/<root>/<namespace>/<class>` | Collection, or class with `IncludeQualifiers=true`. |
//! | `GET` + `Range: items=a-b` | `/<root>/<namespace>/<class>` | `206` with part of the collection and `Content-Range`. |
//! | `GET`     | `/<root>/<namespace>/<class>/<key>` | Single instance. |
//! | `OPTIONS` | `/<root>/...` | `200 OK` with `Allow: GET, OPTIONS`. |

use crate::address::{self, ItemRange};
use crate::config::GatewayServerConfig;
use crate::error::GatewayError;
use crate::render::{self, LinkBase};
use crate::resolver::{self, ContentRange, Resolved};
use crate::response::{self, ALLOWED_METHODS};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use cimrs_kernel::Repository;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Shared application state
// ─────────────────────────────────────────────────────────────────────────────

/// Shared state injected into every handler via the [`State`] extractor.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn Repository>,
    root: Arc<str>,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, root: impl Into<Arc<str>>) -> Self {
        Self {
            repository,
            root: root.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayServer
// ─────────────────────────────────────────────────────────────────────────────

pub struct GatewayServer {
    config: GatewayServerConfig,
}

impl GatewayServer {
    pub fn new(config: GatewayServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayServerConfig {
        &self.config
    }

    /// Build the axum [`Router`] serving `repository`.
    pub fn build_app(&self, repository: Arc<dyn Repository>) -> Router {
        router(AppState::new(repository, self.config.root.as_str()))
    }

    /// Bind to the configured address and serve until the process exits.
    pub async fn start(self, repository: Arc<dyn Repository>) -> std::io::Result<()> {
        let app = self.build_app(repository);
        let addr = self.config.listen_addr();
        info!(addr = %addr, root = %self.config.root, "CIM-RS gateway starting");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await
    }
}

/// Routes for `state`: the resource tree below the root, `/health`, and a
/// JSON 404 for everything else.
pub fn router(state: AppState) -> Router {
    let root = state.root.clone();
    Router::new()
        .route("/health", get(health_handler))
        .route(&format!("/{root}"), any(resource_handler))
        .route(&format!("/{root}/"), any(resource_handler))
        .route(&format!("/{root}/{{*resource}}"), any(resource_handler))
        .fallback(fallback_handler)
        .layer(middleware::from_fn(access_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "cimrs-gateway" }))
}

/// Every method on a resource path.
async fn resource_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let self_uri = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    if method == Method::OPTIONS {
        return response::options_response();
    }
    if method != Method::GET && method != Method::HEAD {
        let err = GatewayError::MethodNotAllowed(method.to_string());
        warn!(method = %method, uri = %self_uri, "method not supported");
        let mut resp = response::emit_error(&err, Some(self_uri), method.as_str()).into_response();
        resp.headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        return resp;
    }

    let range = headers.get(header::RANGE).map(|v| v.to_str().unwrap_or_default());
    match serve_get(&state, uri.path(), uri.query(), range) {
        Ok((document, None)) => response::emit(document, StatusCode::OK).into_response(),
        Ok((document, Some(content_range))) => {
            response::emit_partial(document, &content_range).into_response()
        }
        Err(err) => {
            log_failure(&err, self_uri);
            response::emit_error(&err, Some(self_uri), method.as_str()).into_response()
        }
    }
}

/// parse → resolve → render
fn serve_get(
    state: &AppState,
    path: &str,
    query: Option<&str>,
    range: Option<&str>,
) -> Result<(serde_json::Value, Option<ContentRange>), GatewayError> {
    let (address, mut options) = address::parse_request(&state.root, path, query)?;
    options.range = range.map(ItemRange::parse).transpose()?;
    debug!(
        namespace = %address.namespace,
        class = %address.class_name,
        kind = ?address.kind,
        "request addressed"
    );
    let resolved = resolver::resolve(state.repository.as_ref(), &address, &options)?;
    let base = LinkBase {
        root: &state.root,
        namespace: &address.namespace,
    };
    let document = render::render(&resolved, &options, base)?;
    let content_range = match resolved {
        Resolved::Collection(_, _, content_range) => content_range,
        _ => None,
    };
    Ok((document, content_range))
}

fn log_failure(err: &GatewayError, uri: &str) {
    let (status, _) = err.status();
    if status.is_server_error() {
        error!(uri = %uri, status = status.as_u16(), error = %err, "request failed");
    } else if status == StatusCode::BAD_REQUEST {
        warn!(uri = %uri, status = status.as_u16(), error = %err, "bad request");
    } else {
        debug!(uri = %uri, status = status.as_u16(), error = %err, "resource not found");
    }
}

async fn fallback_handler(method: Method, uri: Uri) -> Response {
    let err = GatewayError::NotFound(format!("no resource at '{}'", uri.path()));
    response::emit_error(&err, Some(uri.path()), method.as_str()).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Access log
// ─────────────────────────────────────────────────────────────────────────────

/// One inbound and one outbound event per request, with latency.
async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    info!(method = %method, path = %path, "→ inbound request");
    let response = next.run(request).await;

    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let status = response.status().as_u16();
    if response.status().is_server_error() {
        error!(method = %method, path = %path, status, latency_ms, "← error response");
    } else {
        info!(method = %method, path = %path, status, latency_ms, "← outbound response");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use axum::body::Body;
    use cimrs_kernel::model::{
        CimType, CimValue, ClassSchema, Instance, Namespace, PropertyDescriptor, Qualifier,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let ns = Namespace::new("root/acme");
        let mut repo = InMemoryRepository::new();
        repo.add_class(
            &ns,
            ClassSchema::new("ACME_Widget").with_property(
                PropertyDescriptor::new("Id", CimType::Uint8)
                    .with_qualifier(Qualifier::new("Key", CimValue::Boolean(true))),
            ),
        )
        .unwrap();
        repo.add_instance(&ns, Instance::new("ACME_Widget").with_property("Id", CimValue::Uint8(5)))
            .unwrap();
        GatewayServer::new(GatewayServerConfig {
            root: "rs".into(),
            ..Default::default()
        })
        .build_app(Arc::new(repo))
    }

    async fn send(method: Method, uri: &str) -> Response {
        app()
            .oneshot(
                axum::http::Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = send(Method::GET, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "cimrs-gateway");
    }

    #[tokio::test]
    async fn configured_root_serves_resources() {
        let response = send(Method::GET, "/rs/root%2Facme/ACME_Widget/5").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"Id": 5}));

        let response = send(Method::GET, "/cimrs/root%2Facme/ACME_Widget/5").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bare_root_is_a_bad_request() {
        let response = send(Method::GET, "/rs").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "errorresponse");
    }

    #[tokio::test]
    async fn trailing_slash_root_is_a_bad_request() {
        let response = send(Method::GET, "/rs/").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let doc = json_body(response).await;
        assert_eq!(doc["statuscode"], 4);
        assert_eq!(doc["message"], "bad request: missing namespace segment");
    }

    #[tokio::test]
    async fn unsupported_method_is_405_with_allow() {
        let response = send(Method::DELETE, "/rs/root%2Facme/ACME_Widget/5").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, OPTIONS");
        let doc = json_body(response).await;
        assert_eq!(doc["statuscode"], 7);
        assert_eq!(doc["httpmethod"], "DELETE");
    }

    #[tokio::test]
    async fn options_on_resource() {
        let response = send(Method::OPTIONS, "/rs/root%2Facme/ACME_Widget").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, OPTIONS");
    }
}

//! `cimrs-gateway` — CIM-RS REST/JSON gateway runtime.
//!
//! Serves the classes and instances of a [`Repository`] as JSON over HTTP.
//! A request flows through four stages:
//!
//! | Stage | Module |
//! |-------|--------|
//! | URI addressor | [`address`] |
//! | Resource resolver | [`resolver`] |
//! | Representation builder | [`render`] (leaf values via [`types`]) |
//! | Response emitter | [`response`] |
//!
//! [`server::GatewayServer`] wires the stages into an axum service and
//! [`repository::InMemoryRepository`] implements the kernel [`Repository`]
//! contract for tests and local serving.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cimrs_gateway::config::GatewayServerConfig;
//! use cimrs_gateway::repository::load_fixture;
//! use cimrs_gateway::server::GatewayServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let repository = load_fixture("fixtures/test_provider.json").unwrap();
//!     let server = GatewayServer::new(GatewayServerConfig {
//!         port: 5988,
//!         ..Default::default()
//!     });
//!     server.start(Arc::new(repository)).await.unwrap();
//! }
//! ```
//!
//! [`Repository`]: cimrs_kernel::Repository

pub mod address;
pub mod config;
pub mod error;
pub mod render;
pub mod repository;
pub mod resolver;
pub mod response;
pub mod server;
pub mod types;

pub use cimrs_kernel::model;

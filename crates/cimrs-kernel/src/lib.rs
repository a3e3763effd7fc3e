//! `cimrs-kernel` — contracts and object model for the CIM-RS gateway.
//!
//! This crate defines the *data model and trait interfaces* the gateway is
//! built against. No HTTP lives here; the axum runtime, the JSON type mapper
//! and the in-memory repository belong in `cimrs-gateway`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              cimrs-kernel  (this crate)                     │
//! │  model: Namespace, ClassName, CimType, CimValue             │
//! │         ClassSchema, Instance, KeyBindings                  │
//! │  Repository trait          RepositoryError                  │
//! │  config loader             KernelError                      │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │  depends on
//! ┌──────────────────────────▼──────────────────────────────────┐
//! │              cimrs-gateway  (runtime crate)                 │
//! │  address → resolver → render → response                     │
//! │  InMemoryRepository: impl Repository                        │
//! │  GatewayServer  (axum HTTP server)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use cimrs_kernel::model::{
//!     CimType, CimValue, ClassSchema, Instance, PropertyDescriptor, Qualifier,
//! };
//!
//! let class = ClassSchema::new("ACME_Widget")
//!     .with_property(
//!         PropertyDescriptor::new("Id", CimType::Uint32)
//!             .with_qualifier(Qualifier::new("Key", CimValue::Boolean(true))),
//!     )
//!     .with_property(PropertyDescriptor::new("Name", CimType::String));
//!
//! let widget = Instance::new("ACME_Widget")
//!     .with_property("Id", CimValue::Uint32(7))
//!     .with_property("Name", CimValue::Null);
//!
//! let keys = widget.key_bindings(&class);
//! assert_eq!(keys.len(), 1);
//! assert!(widget.matches(&keys));
//! ```

#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod model;
pub mod repository;

pub use error::{KernelError, KernelResult};
pub use repository::{Repository, RepositoryError};

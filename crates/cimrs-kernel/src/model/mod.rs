//! CIM object model.
//!
//! Every type here is request-scoped: the repository hands out owned
//! snapshots and the gateway discards them once the response is written.

pub mod instance;
pub mod names;
pub mod schema;
pub mod value;

// ── Flat re-exports ────────────────────────────────────────────────────────

pub use instance::{Instance, KeyBinding, KeyBindings, Property};
pub use names::{ClassName, Namespace};
pub use schema::{ClassSchema, PropertyDescriptor, Qualifier};
pub use value::{CimType, CimValue, UnknownCimType};

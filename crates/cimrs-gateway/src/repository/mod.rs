//! Repository implementations.
//!
//! - [`InMemoryRepository`]: in-process class and instance store
//! - [`fixture`]: seeds an [`InMemoryRepository`] from a JSON/YAML document

pub mod fixture;
pub mod memory;

pub use fixture::{from_document, load_fixture};
pub use memory::InMemoryRepository;

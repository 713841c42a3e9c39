// TodoStore - Per-user todo records over HTTP with in-memory or JSON file storage

pub mod config;
pub mod error;
pub mod json_store;
pub mod priority;
pub mod record;
pub mod server;
pub mod snapshot;
pub mod store;
pub mod validate;

// Re-export main types for convenience
pub use error::{TodoError, ValidationCause};
pub use json_store::JsonStore;
pub use priority::{Priority, PriorityError, parse_priority};
pub use record::{Todo, TodoPayload};
pub use store::{MemoryStore, SharedStore, TodoStore};
pub use validate::{ApiVersion, validate};

//! Persistence Adapters - Document Store Implementations
//!
//! Implements the `DocumentStore` port with an atomic JSON file
//! store for production and a process-local store for tests
//! and dry runs. Both apply a `WriteBatch` all-or-nothing.

pub mod collections;
pub mod json_file;
pub mod memory;

pub use collections::{Collections, SocialCollections, SyncCollections};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

//! Key-value persistence
//!
//! The task store treats storage as an opaque slot per key holding a JSON string.

mod file_store;
mod memory_store;
mod repository;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
pub use repository::KeyValueStore;

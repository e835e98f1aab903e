//! Key-value store trait
//!
//! Defines the interface the task store persists through.

use async_trait::async_trait;

use crate::Result;

/// Durable string slots addressed by key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if the slot was never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

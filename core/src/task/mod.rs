//! Task module
//!
//! This module contains the task model, the ordered collection and the store.

mod list;
mod model;
mod store;

pub use list::{ReorderMode, TaskList};
pub use model::*;
pub use store::{Reordered, TaskStore, TaskStoreConfig, DEFAULT_STORAGE_KEY};

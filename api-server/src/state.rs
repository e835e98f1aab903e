//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskkit_core::filter::FilterStore;
use taskkit_core::storage::FileKeyValueStore;
use taskkit_core::task::TaskStore;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: Arc<TaskStore>,
    filter_store: Arc<FilterStore>,
    data_dir: PathBuf,
}

impl AppState {
    /// Create an AppState from already built stores
    pub fn new(
        task_store: Arc<TaskStore>,
        filter_store: Arc<FilterStore>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                task_store,
                filter_store,
                data_dir,
            }),
        }
    }

    /// Build the stores described by `config`, hydrating tasks from the data directory
    pub async fn from_config(config: &ServerConfig) -> Self {
        let storage = Arc::new(FileKeyValueStore::new(&config.data_dir));
        let task_store = TaskStore::with_config(storage, config.task_store_config()).await;

        Self::new(
            Arc::new(task_store),
            Arc::new(FilterStore::new()),
            config.data_dir.clone(),
        )
    }

    pub fn task_store(&self) -> &TaskStore {
        &self.inner.task_store
    }

    pub fn filter_store(&self) -> &FilterStore {
        &self.inner.filter_store
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }
}

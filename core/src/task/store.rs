//! Task store
//!
//! Owns the ordered task collection and writes it through to a key-value
//! slot after every mutation that changes it.

use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use super::list::{ReorderMode, TaskList};
use super::model::Task;
use crate::storage::KeyValueStore;
use crate::{Error, Result};

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// Task store settings
#[derive(Debug, Clone)]
pub struct TaskStoreConfig {
    /// Key of the slot holding the serialized collection
    pub storage_key: String,
    /// Bounds handling for `reorder_tasks`
    pub reorder_mode: ReorderMode,
}

impl Default for TaskStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            reorder_mode: ReorderMode::default(),
        }
    }
}

/// Result of a reorder: whether anything moved, and the collection as it stood
/// when the operation released the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered {
    pub moved: bool,
    pub tasks: TaskList,
}

impl Reordered {
    fn moved(tasks: &TaskList) -> Self {
        Self {
            moved: true,
            tasks: tasks.clone(),
        }
    }

    fn unchanged(tasks: &TaskList) -> Self {
        Self {
            moved: false,
            tasks: tasks.clone(),
        }
    }
}

/// Thread-safe task store with write-through persistence
pub struct TaskStore {
    tasks: RwLock<TaskList>,
    storage: Arc<dyn KeyValueStore>,
    config: TaskStoreConfig,
    changes: watch::Sender<TaskList>,
}

impl TaskStore {
    /// Create a TaskStore hydrated from `storage` with the default settings
    pub async fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(storage, TaskStoreConfig::default()).await
    }

    /// Create a TaskStore hydrated from `storage`
    ///
    /// A missing, unreadable or malformed slot yields an empty collection.
    pub async fn with_config(storage: Arc<dyn KeyValueStore>, config: TaskStoreConfig) -> Self {
        let tasks = load(storage.as_ref(), &config.storage_key).await;
        debug!("Loaded {} tasks from '{}'", tasks.len(), config.storage_key);
        let (changes, _) = watch::channel(tasks.clone());

        Self {
            tasks: RwLock::new(tasks),
            storage,
            config,
            changes,
        }
    }

    /// Snapshot of the ordered collection
    pub async fn tasks(&self) -> TaskList {
        self.tasks.read().await.clone()
    }

    /// Get a task by ID
    pub async fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    /// Receive the collection after each successful mutation
    pub fn subscribe(&self) -> watch::Receiver<TaskList> {
        self.changes.subscribe()
    }

    /// Append a task to the end of the collection
    pub async fn add_task(&self, task: Task) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        let mut next = tasks.clone();
        next.add_task(task.clone())?;
        self.commit(&mut tasks, next).await?;
        debug!("Added task {}", task.id);
        Ok(task)
    }

    /// Delete a task; absent ids are a no-op
    pub async fn delete_task(&self, id: &str) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let mut next = tasks.clone();
        let Some(removed) = next.delete_task(id) else {
            return Ok(None);
        };
        self.commit(&mut tasks, next).await?;
        debug!("Deleted task {}", id);
        Ok(Some(removed))
    }

    /// Replace the task with the same id in place; absent ids are a no-op
    pub async fn update_task(&self, updated: Task) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        let mut next = tasks.clone();
        let id = updated.id.clone();
        if !next.update_task(updated) {
            return Ok(false);
        }
        self.commit(&mut tasks, next).await?;
        debug!("Updated task {}", id);
        Ok(true)
    }

    /// Move the task at `from` to `to`, positions measured after removal
    pub async fn reorder_tasks(&self, from: usize, to: usize) -> Result<Reordered> {
        let mut tasks = self.tasks.write().await;
        let mut next = tasks.clone();
        if !next.move_task(from, to, self.config.reorder_mode)? {
            return Ok(Reordered::unchanged(&tasks));
        }
        self.commit(&mut tasks, next).await?;
        debug!("Moved task from {} to {}", from, to);
        Ok(Reordered::moved(&tasks))
    }

    /// Move the dragged task onto the position of the task it was dropped over
    ///
    /// Both ids are resolved against the unfiltered collection. Unknown ids and
    /// dropping a task onto itself are no-ops.
    pub async fn reorder_by_id(&self, active_id: &str, over_id: &str) -> Result<Reordered> {
        let mut tasks = self.tasks.write().await;
        let (Some(from), Some(to)) = (tasks.position(active_id), tasks.position(over_id)) else {
            return Ok(Reordered::unchanged(&tasks));
        };
        if from == to {
            return Ok(Reordered::unchanged(&tasks));
        }
        let mut next = tasks.clone();
        next.move_task(from, to, ReorderMode::Reject)?;
        self.commit(&mut tasks, next).await?;
        debug!("Moved task {} to {}", active_id, to);
        Ok(Reordered::moved(&tasks))
    }

    /// Persist `next`, then make it the current collection
    ///
    /// On a failed write the current collection is left untouched.
    async fn commit(&self, current: &mut TaskList, next: TaskList) -> Result<()> {
        let content = serde_json::to_string(&next)?;
        self.storage
            .set(&self.config.storage_key, &content)
            .await
            .map_err(|e| match e {
                Error::Storage(_) => e,
                other => Error::Storage(format!("Failed to save tasks: {}", other)),
            })?;

        *current = next;
        self.changes.send_replace(current.clone());
        Ok(())
    }
}

async fn load(storage: &dyn KeyValueStore, key: &str) -> TaskList {
    let content = match storage.get(key).await {
        Ok(Some(content)) => content,
        Ok(None) => return TaskList::new(),
        Err(e) => {
            warn!("Failed to read tasks from '{}', starting empty: {}", key, e);
            return TaskList::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Failed to parse tasks from '{}', starting empty: {}", key, e);
        TaskList::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use crate::task::{NewTask, TaskPriority};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct BrokenStorage;

    #[async_trait]
    impl KeyValueStore for BrokenStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("disk on fire".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disk on fire".to_string()))
        }
    }

    fn task(id: &str, priority: TaskPriority) -> Task {
        Task::new(id, format!("Task {}", id), "d").with_priority(priority)
    }

    fn ids(list: &TaskList) -> Vec<String> {
        list.iter().map(|t| t.id.clone()).collect()
    }

    async fn create_test_store() -> (TaskStore, Arc<MemoryKeyValueStore>) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = TaskStore::new(storage.clone()).await;
        (store, storage)
    }

    async fn seeded_store() -> (TaskStore, Arc<MemoryKeyValueStore>) {
        let (store, storage) = create_test_store().await;
        store.add_task(task("1", TaskPriority::High)).await.unwrap();
        store.add_task(task("2", TaskPriority::Medium)).await.unwrap();
        store.add_task(task("3", TaskPriority::Low)).await.unwrap();
        (store, storage)
    }

    async fn stored(storage: &MemoryKeyValueStore) -> TaskList {
        let content = storage.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[tokio::test]
    async fn test_add_to_empty_store() {
        let (store, storage) = create_test_store().await;
        let t1 = task("1", TaskPriority::Low);
        store.add_task(t1.clone()).await.unwrap();

        let tasks = store.tasks().await;
        assert_eq!(&tasks[..], &[t1.clone()]);
        assert_eq!(&stored(&storage).await[..], &[t1]);
    }

    #[tokio::test]
    async fn test_add_appends_and_keeps_prior_order() {
        let (store, _storage) = seeded_store().await;
        store.add_task(task("4", TaskPriority::Low)).await.unwrap();
        assert_eq!(ids(&store.tasks().await), vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_without_write() {
        let (store, storage) = seeded_store().await;
        let writes = storage.write_count();

        let result = store.add_task(task("2", TaskPriority::High)).await;
        match result.unwrap_err() {
            Error::DuplicateTask(id) => assert_eq!(id, "2"),
            e => panic!("Expected DuplicateTask error, got: {:?}", e),
        }
        assert_eq!(ids(&store.tasks().await), vec!["1", "2", "3"]);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, storage) = seeded_store().await;
        let removed = store.delete_task("2").await.unwrap();
        assert_eq!(removed.unwrap().id, "2");
        assert_eq!(ids(&store.tasks().await), vec!["1", "3"]);
        assert_eq!(ids(&stored(&storage).await), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_delete_and_update_unknown_are_noops() {
        let (store, storage) = seeded_store().await;
        let before = store.tasks().await;
        let writes = storage.write_count();

        assert!(store.delete_task("missing").await.unwrap().is_none());
        assert!(!store
            .update_task(task("missing", TaskPriority::High))
            .await
            .unwrap());

        assert_eq!(store.tasks().await, before);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let (store, storage) = seeded_store().await;
        let mut edited = store.get("2").await.unwrap();
        edited.title = "Edited".to_string();
        edited.priority = TaskPriority::High;

        assert!(store.update_task(edited.clone()).await.unwrap());
        let tasks = store.tasks().await;
        assert_eq!(ids(&tasks), vec!["1", "2", "3"]);
        assert_eq!(tasks[1], edited);
        assert_eq!(stored(&storage).await[1], edited);
    }

    #[tokio::test]
    async fn test_reorder_tasks() {
        let (store, storage) = seeded_store().await;
        let reordered = store.reorder_tasks(0, 2).await.unwrap();
        assert!(reordered.moved);
        assert_eq!(ids(&reordered.tasks), vec!["2", "3", "1"]);
        assert_eq!(ids(&store.tasks().await), vec!["2", "3", "1"]);
        assert_eq!(ids(&stored(&storage).await), vec!["2", "3", "1"]);

        assert!(store.reorder_tasks(2, 0).await.unwrap().moved);
        assert_eq!(ids(&store.tasks().await), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_reorder_out_of_range_rejected() {
        let (store, storage) = seeded_store().await;
        let writes = storage.write_count();

        let result = store.reorder_tasks(5, 0).await;
        assert!(matches!(
            result,
            Err(Error::IndexOutOfRange { index: 5, len: 3 })
        ));
        assert_eq!(ids(&store.tasks().await), vec!["1", "2", "3"]);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_reorder_out_of_range_clamped() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let config = TaskStoreConfig {
            reorder_mode: ReorderMode::Clamp,
            ..TaskStoreConfig::default()
        };
        let store = TaskStore::with_config(storage, config).await;
        store.add_task(task("1", TaskPriority::Low)).await.unwrap();
        store.add_task(task("2", TaskPriority::Low)).await.unwrap();

        assert!(store.reorder_tasks(0, 10).await.unwrap().moved);
        assert_eq!(ids(&store.tasks().await), vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_reorder_by_id() {
        let (store, _storage) = seeded_store().await;

        let reordered = store.reorder_by_id("3", "1").await.unwrap();
        assert!(reordered.moved);
        assert_eq!(ids(&reordered.tasks), vec!["3", "1", "2"]);
        assert_eq!(ids(&store.tasks().await), vec!["3", "1", "2"]);

        let unchanged = store.reorder_by_id("3", "3").await.unwrap();
        assert!(!unchanged.moved);
        assert_eq!(ids(&unchanged.tasks), vec!["3", "1", "2"]);
        assert!(!store.reorder_by_id("missing", "1").await.unwrap().moved);
        assert!(!store.reorder_by_id("1", "missing").await.unwrap().moved);
        assert_eq!(ids(&store.tasks().await), vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_unreadable_storage_starts_empty() {
        let store = TaskStore::new(Arc::new(BrokenStorage)).await;
        assert!(store.tasks().await.is_empty());

        let result = store.add_task(task("1", TaskPriority::Low)).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(store.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_state() {
        let (store, storage) = seeded_store().await;
        let before = store.tasks().await;
        let mut rx = store.subscribe();
        storage.set_fail_writes(true);

        let result = store.add_task(task("4", TaskPriority::Low)).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.tasks().await, before);

        let result = store.delete_task("2").await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.tasks().await, before);

        let mut edited = task("2", TaskPriority::High);
        edited.title = "Edited".to_string();
        let result = store.update_task(edited).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.tasks().await, before);

        let result = store.reorder_tasks(0, 2).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.tasks().await, before);

        let result = store.reorder_by_id("3", "1").await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.tasks().await, before);

        // Nothing was committed, so nothing was announced or stored
        assert!(!rx.has_changed().unwrap());
        assert_eq!(stored(&storage).await, before);

        storage.set_fail_writes(false);
        store.delete_task("2").await.unwrap();
        assert_eq!(ids(&store.tasks().await), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_invalid_json_starts_empty() {
        for payload in ["not json", "{\"id\":1}", "null", "[{\"id\":\"1\"}]"] {
            let storage = Arc::new(MemoryKeyValueStore::with_value(DEFAULT_STORAGE_KEY, payload));
            let store = TaskStore::new(storage).await;
            assert!(store.tasks().await.is_empty(), "payload {:?}", payload);
        }
    }

    #[tokio::test]
    async fn test_hydrates_existing_tasks() {
        let payload = r#"[
            {"id":"a","title":"A","description":"d","priority":"High"},
            {"id":"b","title":"B","description":"d","priority":"Low"}
        ]"#;
        let storage = Arc::new(MemoryKeyValueStore::with_value(DEFAULT_STORAGE_KEY, payload));
        let store = TaskStore::new(storage).await;

        let tasks = store.tasks().await;
        assert_eq!(ids(&tasks), vec!["a", "b"]);
        assert_eq!(tasks[0].priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_store() {
        let (store, storage) = create_test_store().await;

        let result = NewTask::new("", "d").into_task();
        assert!(matches!(result, Err(Error::Validation(_))));

        assert!(store.tasks().await.is_empty());
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_sees_each_mutation() {
        let (store, _storage) = create_test_store().await;
        let mut rx = store.subscribe();

        store.add_task(task("1", TaskPriority::Low)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(ids(&rx.borrow_and_update()), vec!["1"]);

        // No-ops do not notify
        store.delete_task("missing").await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let storage = Arc::new(FileKeyValueStore::new(temp_dir.path()));
            let store = TaskStore::new(storage).await;
            store.add_task(task("1", TaskPriority::High)).await.unwrap();
            store.add_task(task("2", TaskPriority::Medium)).await.unwrap();
            store.reorder_tasks(1, 0).await.unwrap();
        }

        let storage = Arc::new(FileKeyValueStore::new(temp_dir.path()));
        let store = TaskStore::new(storage).await;
        let tasks = store.tasks().await;
        assert_eq!(ids(&tasks), vec!["2", "1"]);
        assert_eq!(tasks[1].priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let config = TaskStoreConfig {
            storage_key: "todo".to_string(),
            ..TaskStoreConfig::default()
        };
        let store = TaskStore::with_config(storage.clone(), config).await;
        store.add_task(task("1", TaskPriority::Low)).await.unwrap();

        assert!(storage.get("todo").await.unwrap().is_some());
        assert!(storage.get(DEFAULT_STORAGE_KEY).await.unwrap().is_none());
    }
}

//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk, newest first, and publishes a
//! fresh snapshot to live subscribers after every mutation.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::{Task, TaskId};
use super::repository::TaskRepository;
use crate::live::{LivePublisher, LiveTasks};
use crate::{Error, Result};

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file, `None` for a store that is never persisted
    path: Option<PathBuf>,
    /// In-memory copy of the tasks, newest first
    cache: RwLock<Vec<Task>>,
    live: LivePublisher,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut tasks: Vec<Task> = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        // Stable sort keeps the on-disk order for equal timestamps
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!("Loaded {} tasks from {}", tasks.len(), path.display());

        Ok(Self {
            path: Some(path),
            live: LivePublisher::with_snapshot(tasks.clone()),
            cache: RwLock::new(tasks),
        })
    }

    /// Create a store that lives only in memory
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            cache: RwLock::new(Vec::new()),
            live: LivePublisher::with_snapshot(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Apply `change` to a copy of the cache, persist it, then swap it in
    ///
    /// The write lock is held throughout, so a failed write leaves the cache
    /// and the live list untouched and snapshots are published in order.
    async fn mutate<T>(&self, change: impl FnOnce(&mut Vec<Task>) -> Result<T>) -> Result<T> {
        let mut cache = self.cache.write().await;
        let mut staged = cache.clone();
        let output = change(&mut staged)?;

        if let Some(path) = &self.path {
            let content = serde_json::to_string_pretty(&staged)?;

            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            tokio::fs::write(path, content).await?;
        }

        *cache = staged;
        self.live.publish(cache.clone());
        Ok(output)
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, text: String) -> Result<TaskId> {
        let task = Task::new(text);
        let id = task.id;
        self.mutate(|tasks| {
            // Newest first; a later insert goes ahead of equal timestamps
            let index = tasks.partition_point(|t| t.created_at > task.created_at);
            tasks.insert(index, task);
            Ok(())
        })
        .await?;
        debug!("Created task {}", id);
        Ok(id)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let cache = self.cache.read().await;
        Ok(cache.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        Ok(self.cache.read().await.clone())
    }

    async fn toggle(&self, id: TaskId) -> Result<bool> {
        let completed = self
            .mutate(|tasks| {
                let task = find_mut(tasks, id)?;
                task.is_completed = !task.is_completed;
                Ok(task.is_completed)
            })
            .await?;
        debug!("Toggled task {} to completed={}", id, completed);
        Ok(completed)
    }

    async fn update_text(&self, id: TaskId, text: String) -> Result<()> {
        self.mutate(|tasks| {
            find_mut(tasks, id)?.text = text;
            Ok(())
        })
        .await?;
        debug!("Updated text of task {}", id);
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> Result<()> {
        self.mutate(|tasks| {
            let index = tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            tasks.remove(index);
            Ok(())
        })
        .await?;
        debug!("Removed task {}", id);
        Ok(())
    }

    fn subscribe(&self) -> LiveTasks {
        self.live.subscribe()
    }
}

fn find_mut(tasks: &mut [Task], id: TaskId) -> Result<&mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todos.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_task() {
        let (store, _temp) = create_test_store().await;

        let id = store.create("Buy milk".to_string()).await.unwrap();
        let task = store.get(id).await.unwrap().unwrap();

        assert_eq!(task.text, "Buy milk");
        assert!(!task.is_completed);
    }

    #[tokio::test]
    async fn test_create_accepts_empty_text() {
        let store = FileTaskStore::ephemeral();
        let id = store.create(String::new()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().unwrap().text, "");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (store, _temp) = create_test_store().await;

        let first = store.create("Task 1".to_string()).await.unwrap();
        let second = store.create("Task 2".to_string()).await.unwrap();
        let third = store.create("Task 3".to_string()).await.unwrap();

        let ids: Vec<TaskId> = store.list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_toggle_task() {
        let (store, _temp) = create_test_store().await;
        let id = store.create("Walk dog".to_string()).await.unwrap();

        assert!(store.toggle(id).await.unwrap());
        assert!(store.get(id).await.unwrap().unwrap().is_completed);
        assert!(!store.toggle(id).await.unwrap());
        assert!(!store.get(id).await.unwrap().unwrap().is_completed);
    }

    #[tokio::test]
    async fn test_toggle_nonexistent_task() {
        let (store, _temp) = create_test_store().await;

        let result = store.toggle(TaskId::generate()).await;
        match result.unwrap_err() {
            Error::TaskNotFound(_) => {}
            e => panic!("Expected TaskNotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_text_keeps_other_fields() {
        let (store, _temp) = create_test_store().await;
        let id = store.create("Old text".to_string()).await.unwrap();
        store.toggle(id).await.unwrap();
        let before = store.get(id).await.unwrap().unwrap();

        store.update_text(id, "New text".to_string()).await.unwrap();

        let after = store.get(id).await.unwrap().unwrap();
        assert_eq!(after.text, "New text");
        assert_eq!(after.is_completed, before.is_completed);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let (store, _temp) = create_test_store().await;

        let result = store.update_text(TaskId::generate(), "x".to_string()).await;
        assert!(matches!(result, Err(Error::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_task() {
        let (store, _temp) = create_test_store().await;
        let id = store.create("Task to delete".to_string()).await.unwrap();
        assert!(store.get(id).await.unwrap().is_some());

        store.remove(id).await.unwrap();

        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().iter().all(|t| t.id != id));

        // Removing again reports the missing task
        assert!(matches!(store.remove(id).await, Err(Error::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let store = FileTaskStore::ephemeral();
        let mut live = store.subscribe();
        assert_eq!(live.current(), Some(Vec::new()));

        let id = store.create("Buy milk".to_string()).await.unwrap();
        let tasks = live.wait_until(|tasks| tasks.len() == 1).await.unwrap();
        assert_eq!(tasks[0].id, id);

        store.toggle(id).await.unwrap();
        let tasks = live
            .wait_until(|tasks| tasks.first().is_some_and(|t| t.is_completed))
            .await
            .unwrap();
        assert_eq!(tasks[0].id, id);

        store.remove(id).await.unwrap();
        live.wait_until(|tasks| tasks.is_empty()).await.unwrap();
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("todos.json");

        let older;
        let newer;
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            older = store.create("Persistent task".to_string()).await.unwrap();
            newer = store.create("Second task".to_string()).await.unwrap();
            store.toggle(older).await.unwrap();
        }

        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let tasks = store.list().await.unwrap();
            assert_eq!(tasks.len(), 2);
            assert_eq!(tasks[0].id, newer);
            assert_eq!(tasks[1].id, older);
            assert!(tasks[1].is_completed);
            assert_eq!(store.subscribe().current().map(|t| t.len()), Some(2));
        }
    }

    #[tokio::test]
    async fn test_load_sorts_by_created_at() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todos.json");
        let old = Task::new("old").with_created_at(1);
        let new = Task::new("new").with_created_at(2);
        tokio::fs::write(&path, serde_json::to_string(&vec![old, new]).unwrap())
            .await
            .unwrap();

        let store = FileTaskStore::new(&path).await.unwrap();
        let texts: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todos.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(matches!(
            FileTaskStore::new(&path).await,
            Err(Error::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_create_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = temp_dir.path().join("blocker");
        tokio::fs::write(&blocker, "").await.unwrap();

        let store = FileTaskStore::new(blocker.join("todos.json")).await.unwrap();
        let live = store.subscribe();

        assert!(matches!(
            store.create("Buy milk".to_string()).await,
            Err(Error::Io(_))
        ));
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(live.current(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_mutations() {
        let (store, temp_dir) = create_test_store().await;
        let id = store.create("Buy milk".to_string()).await.unwrap();
        let live = store.subscribe();

        // Replace the data file with a directory so every write fails
        let path = temp_dir.path().join("todos.json");
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        assert!(store.toggle(id).await.is_err());
        assert!(store.update_text(id, "New text".to_string()).await.is_err());
        assert!(store.remove(id).await.is_err());

        let tasks = store.list().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
        assert!(!tasks[0].is_completed);
        assert_eq!(live.current(), Some(tasks));
    }
}

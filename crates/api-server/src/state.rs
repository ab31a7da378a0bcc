//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use todo_core::task::FileTaskStore;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: Arc<FileTaskStore>,
    data_dir: Option<PathBuf>,
}

impl AppState {
    /// Create a new AppState from the server configuration
    pub async fn new(config: &ServerConfig) -> todo_core::Result<Self> {
        if config.ephemeral {
            return Ok(Self::with_store(Arc::new(FileTaskStore::ephemeral()), None));
        }

        let task_store = FileTaskStore::new(config.tasks_path()).await?;
        Ok(Self::with_store(
            Arc::new(task_store),
            Some(config.data_dir.clone()),
        ))
    }

    pub fn with_store(task_store: Arc<FileTaskStore>, data_dir: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                task_store,
                data_dir,
            }),
        }
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &FileTaskStore {
        &self.inner.task_store
    }

    pub fn task_store_arc(&self) -> Arc<FileTaskStore> {
        Arc::clone(&self.inner.task_store)
    }

    /// Data directory, `None` when running without persistence
    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.inner.data_dir.as_ref()
    }
}

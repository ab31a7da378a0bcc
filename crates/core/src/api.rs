//! Data access layer
//!
//! [`TaskApi`] is the typed surface every front end talks to. Item rows only
//! ever see the narrower [`TaskActions`] capability.

use async_trait::async_trait;
use std::sync::Arc;

use crate::live::LiveTasks;
use crate::task::{TaskId, TaskRepository};
use crate::Result;

/// Per-item capability handed to list rows
#[async_trait]
pub trait TaskActions: Send + Sync {
    /// Flip the completion flag of a task
    async fn toggle(&self, id: TaskId) -> Result<()>;

    /// Delete a task
    async fn remove(&self, id: TaskId) -> Result<()>;
}

/// Full set of operations against the item store
#[async_trait]
pub trait TaskApi: TaskActions {
    /// Create a pending task and return its id
    async fn create(&self, text: String) -> Result<TaskId>;

    /// Overwrite the text of a task
    async fn update(&self, id: TaskId, text: String) -> Result<()>;

    /// Live, newest-first list of every task
    fn list(&self) -> LiveTasks;
}

/// In-process API over any [`TaskRepository`]
pub struct LocalTaskApi<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: TaskRepository + ?Sized> LocalTaskApi<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }
}

impl<R: ?Sized> Clone for LocalTaskApi<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

#[async_trait]
impl<R: TaskRepository + ?Sized> TaskActions for LocalTaskApi<R> {
    async fn toggle(&self, id: TaskId) -> Result<()> {
        self.repo.toggle(id).await.map(|_| ())
    }

    async fn remove(&self, id: TaskId) -> Result<()> {
        self.repo.remove(id).await
    }
}

#[async_trait]
impl<R: TaskRepository + ?Sized> TaskApi for LocalTaskApi<R> {
    async fn create(&self, text: String) -> Result<TaskId> {
        self.repo.create(text).await
    }

    async fn update(&self, id: TaskId, text: String) -> Result<()> {
        self.repo.update_text(id, text).await
    }

    fn list(&self) -> LiveTasks {
        self.repo.subscribe()
    }
}

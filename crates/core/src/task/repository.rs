//! Task repository trait
//!
//! Defines the interface for the item store.

use async_trait::async_trait;

use super::model::{Task, TaskId};
use crate::live::LiveTasks;
use crate::Result;

/// Repository interface for the item store
///
/// Every successful mutation must be visible to subscribers obtained
/// through [`TaskRepository::subscribe`].
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new pending task and return its id
    async fn create(&self, text: String) -> Result<TaskId>;

    /// Get a task by ID
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;

    /// Get all tasks, newest first
    async fn list(&self) -> Result<Vec<Task>>;

    /// Flip the completion flag, returning the new value
    async fn toggle(&self, id: TaskId) -> Result<bool>;

    /// Overwrite the text of a task
    async fn update_text(&self, id: TaskId, text: String) -> Result<()>;

    /// Delete a task permanently
    async fn remove(&self, id: TaskId) -> Result<()>;

    /// Subscribe to the live, newest-first list
    fn subscribe(&self) -> LiveTasks;
}

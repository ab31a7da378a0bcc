//! List rows
//!
//! A row only holds the [`TaskActions`] capability. Its toggle and remove
//! intents run on their own tokio task and report failures back over a
//! channel; the row itself never changes until the live list does.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::edit::EditState;
use crate::api::TaskActions;
use crate::task::{Task, TaskId};

/// Render model of one task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: TaskId,
    pub text: String,
    pub is_completed: bool,
    /// Edit buffer when this row is in editing mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<String>,
}

impl ItemView {
    pub fn new(task: &Task, edit: &EditState) -> Self {
        let editing = edit
            .slot()
            .filter(|slot| slot.id == task.id)
            .map(|slot| slot.buffer.clone());
        Self {
            id: task.id,
            text: task.text.clone(),
            is_completed: task.is_completed,
            editing,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}

/// Fire-and-forget row intents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIntent {
    Toggle,
    Remove,
}

/// Dispatch `intent` for `id` without waiting for it
///
/// Failures are logged and sent on `errors`.
pub fn dispatch(
    actions: Arc<dyn TaskActions>,
    id: TaskId,
    intent: RowIntent,
    errors: mpsc::UnboundedSender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = match intent {
            RowIntent::Toggle => actions.toggle(id).await,
            RowIntent::Remove => actions.remove(id).await,
        };
        if let Err(e) = result {
            warn!("Failed to {:?} task {}: {}", intent, id, e);
            let _ = errors.send(e.to_string());
        }
    })
}

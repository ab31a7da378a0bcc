//! Single-slot edit state machine
//!
//! At most one task is being edited. Starting a new edit replaces the slot
//! and drops whatever was typed into the previous buffer.

use serde::Serialize;

use crate::task::{Task, TaskId};

/// Keys the edit input reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

/// The task being edited and its transient text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSlot {
    pub id: TaskId,
    pub buffer: String,
}

/// What a save request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    /// Send `text` to the store for `id`
    Commit { id: TaskId, text: String },
    /// The buffer is blank; stay in editing
    Blank,
    /// `id` is not the task being edited
    NotEditing,
}

#[derive(Debug, Clone, Default)]
pub struct EditState {
    slot: Option<EditSlot>,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter editing for `task`, seeding the buffer with its text
    pub fn begin(&mut self, task: &Task) {
        self.slot = Some(EditSlot {
            id: task.id,
            buffer: task.text.clone(),
        });
    }

    pub fn slot(&self) -> Option<&EditSlot> {
        self.slot.as_ref()
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.slot.as_ref().is_some_and(|slot| slot.id == id)
    }

    /// Replace the buffer text; ignored while viewing
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        if let Some(slot) = self.slot.as_mut() {
            slot.buffer = text.into();
        }
    }

    /// Decide what saving `id` should do. The buffer is sent untrimmed.
    pub fn save_request(&self, id: TaskId) -> SaveRequest {
        match &self.slot {
            Some(slot) if slot.id == id => {
                if slot.buffer.trim().is_empty() {
                    SaveRequest::Blank
                } else {
                    SaveRequest::Commit {
                        id,
                        text: slot.buffer.clone(),
                    }
                }
            }
            _ => SaveRequest::NotEditing,
        }
    }

    /// Leave editing after `id` was saved
    pub fn finish(&mut self, id: TaskId) {
        if self.is_editing(id) {
            self.slot = None;
        }
    }

    /// Leave editing without saving
    pub fn cancel(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_seeds_buffer() {
        let task = Task::new("Buy milk");
        let mut edit = EditState::new();
        edit.begin(&task);

        assert!(edit.is_editing(task.id));
        assert_eq!(edit.slot().unwrap().buffer, "Buy milk");
    }

    #[test]
    fn test_second_edit_discards_first_buffer() {
        let x = Task::new("X");
        let y = Task::new("Y");
        let mut edit = EditState::new();

        edit.begin(&x);
        edit.set_buffer("X changed");
        edit.begin(&y);

        assert!(!edit.is_editing(x.id));
        assert_eq!(edit.slot().unwrap().buffer, "Y");
        assert_eq!(edit.save_request(x.id), SaveRequest::NotEditing);
    }

    #[test]
    fn test_save_request() {
        let task = Task::new("Old");
        let mut edit = EditState::new();
        assert_eq!(edit.save_request(task.id), SaveRequest::NotEditing);

        edit.begin(&task);
        edit.set_buffer("  New text ");
        assert_eq!(
            edit.save_request(task.id),
            SaveRequest::Commit {
                id: task.id,
                text: "  New text ".to_string()
            }
        );

        edit.set_buffer("   ");
        assert_eq!(edit.save_request(task.id), SaveRequest::Blank);
    }

    #[test]
    fn test_finish_and_cancel() {
        let x = Task::new("X");
        let y = Task::new("Y");
        let mut edit = EditState::new();

        edit.begin(&x);
        edit.finish(y.id);
        assert!(edit.is_editing(x.id));
        edit.finish(x.id);
        assert!(edit.slot().is_none());

        edit.begin(&y);
        edit.cancel();
        assert!(edit.slot().is_none());
    }

    #[test]
    fn test_set_buffer_while_viewing_is_ignored() {
        let mut edit = EditState::new();
        edit.set_buffer("typed");
        assert!(edit.slot().is_none());
    }
}

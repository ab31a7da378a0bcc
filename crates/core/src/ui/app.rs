//! Root presentation component
//!
//! [`TodoApp`] owns the UI state (new-task input, search term, edit slot and
//! the last surfaced error), turns user intents into data access calls and
//! renders a [`Screen`] from the live list on demand.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::edit::{EditSlot, EditState, Key, SaveRequest};
use super::form::NewTaskForm;
use super::item::{dispatch, ItemView, RowIntent};
use crate::api::{TaskActions, TaskApi};
use crate::live::LiveTasks;
use crate::task::{Task, TaskId};
use crate::theme::ThemeConfig;
use crate::view::{list_state, ListState, SectionKind, LOADING_MESSAGE};
use crate::Result;

pub const TITLE: &str = "My Tasks";
pub const SUBTITLE: &str = "Stay organized with Convex & React";
pub const NEW_TASK_PLACEHOLDER: &str = "What needs to be done?";
pub const ADD_TASK_LABEL: &str = "Add Task";
pub const SEARCH_PLACEHOLDER: &str = "Search tasks...";

/// One titled group of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub kind: SectionKind,
    pub title: String,
    pub items: Vec<ItemView>,
}

/// Render model of the list area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ListView {
    Loading { message: &'static str },
    Empty { message: &'static str },
    /// Completed section first, then pending; empty sections are omitted
    Sections { sections: Vec<SectionView> },
}

impl ListView {
    pub fn section(&self, kind: SectionKind) -> Option<&SectionView> {
        match self {
            Self::Sections { sections } => sections.iter().find(|s| s.kind == kind),
            _ => None,
        }
    }
}

/// Everything a front end needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub theme_class: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub new_task_placeholder: &'static str,
    pub add_task_label: &'static str,
    pub new_task_text: String,
    pub search_placeholder: &'static str,
    pub search_text: String,
    pub list: ListView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Headless root component over a [`TaskApi`]
pub struct TodoApp<A> {
    api: Arc<A>,
    live: LiveTasks,
    theme: ThemeConfig,
    form: NewTaskForm,
    search: String,
    edit: EditState,
    error: Option<String>,
    errors_tx: mpsc::UnboundedSender<String>,
    errors_rx: mpsc::UnboundedReceiver<String>,
}

impl<A: TaskApi + 'static> TodoApp<A> {
    pub fn new(api: Arc<A>, theme: ThemeConfig) -> Self {
        let live = api.list();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        Self {
            api,
            live,
            theme,
            form: NewTaskForm::new(),
            search: String::new(),
            edit: EditState::new(),
            error: None,
            errors_tx,
            errors_rx,
        }
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn new_task_text(&self) -> &str {
        self.form.input()
    }

    pub fn set_new_task_text(&mut self, text: impl Into<String>) {
        self.form.set_input(text);
    }

    /// Submit the new-task form
    ///
    /// Blank input issues no call. The input is cleared only after the store
    /// accepted the task.
    pub async fn submit(&mut self) -> Option<TaskId> {
        let text = self.form.submission()?;
        match self.api.create(text).await {
            Ok(id) => {
                debug!("Created task {}", id);
                self.form.clear();
                Some(id)
            }
            Err(e) => {
                self.report(format!("Failed to create task: {}", e));
                None
            }
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn editing(&self) -> Option<&EditSlot> {
        self.edit.slot()
    }

    /// Put `id` into editing, abandoning any other edit in progress
    ///
    /// Returns `false` when the task is not in the current snapshot.
    pub fn start_edit(&mut self, id: TaskId) -> bool {
        let Some(tasks) = self.live.current() else {
            return false;
        };
        match tasks.iter().find(|t| t.id == id) {
            Some(task) => {
                self.edit.begin(task);
                true
            }
            None => false,
        }
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        self.edit.set_buffer(text);
    }

    /// Save the edit buffer of `id`
    ///
    /// Returns `true` when the text was written and editing ended.
    pub async fn save_edit(&mut self, id: TaskId) -> bool {
        let (id, text) = match self.edit.save_request(id) {
            SaveRequest::Commit { id, text } => (id, text),
            SaveRequest::Blank | SaveRequest::NotEditing => return false,
        };

        match self.api.update(id, text).await {
            Ok(()) => {
                self.edit.finish(id);
                true
            }
            Err(e) => {
                self.report(format!("Failed to update task: {}", e));
                false
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
    }

    /// Key pressed in the edit input of `id`
    pub async fn key_down(&mut self, id: TaskId, key: Key) {
        match key {
            Key::Enter => {
                self.save_edit(id).await;
            }
            Key::Escape => self.cancel_edit(),
            Key::Other => {}
        }
    }

    /// Edit input of `id` lost focus
    pub async fn blur(&mut self, id: TaskId) {
        self.save_edit(id).await;
    }

    /// Toggle `id` without waiting; the handle may be awaited or dropped
    pub fn toggle(&self, id: TaskId) -> JoinHandle<()> {
        dispatch(self.actions(), id, RowIntent::Toggle, self.errors_tx.clone())
    }

    /// Remove `id` without waiting; the handle may be awaited or dropped
    pub fn remove(&self, id: TaskId) -> JoinHandle<()> {
        dispatch(self.actions(), id, RowIntent::Remove, self.errors_tx.clone())
    }

    fn actions(&self) -> Arc<dyn TaskActions> {
        self.api.clone()
    }

    /// Latest surfaced error, including failures of background intents
    pub fn error(&mut self) -> Option<&str> {
        self.drain_errors();
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.drain_errors();
        self.error = None;
    }

    /// Wait for the next live snapshot
    pub async fn changed(&mut self) -> Result<()> {
        self.live.changed().await
    }

    /// Wait until the live list satisfies `predicate`
    pub async fn wait_until<F>(&mut self, predicate: F) -> Result<()>
    where
        F: FnMut(&[Task]) -> bool,
    {
        self.live.wait_until(predicate).await.map(|_| ())
    }

    pub fn render(&mut self) -> Screen {
        self.drain_errors();
        let snapshot = self.live.current();

        let list = match list_state(snapshot.as_deref(), &self.search) {
            ListState::Loading => ListView::Loading {
                message: LOADING_MESSAGE,
            },
            ListState::Empty { message } => ListView::Empty { message },
            ListState::Sections(partition) => {
                let mut sections = Vec::new();
                for (kind, tasks) in [
                    (SectionKind::Completed, &partition.completed),
                    (SectionKind::Pending, &partition.pending),
                ] {
                    if tasks.is_empty() {
                        continue;
                    }
                    sections.push(SectionView {
                        kind,
                        title: kind.title(tasks.len()),
                        items: tasks.iter().map(|t| ItemView::new(t, &self.edit)).collect(),
                    });
                }
                ListView::Sections { sections }
            }
        };

        Screen {
            theme_class: self.theme.class(),
            title: TITLE,
            subtitle: SUBTITLE,
            new_task_placeholder: NEW_TASK_PLACEHOLDER,
            add_task_label: ADD_TASK_LABEL,
            new_task_text: self.form.input().to_string(),
            search_placeholder: SEARCH_PLACEHOLDER,
            search_text: self.search.clone(),
            list,
            error: self.error.clone(),
        }
    }

    fn report(&mut self, message: String) {
        warn!("{}", message);
        self.error = Some(message);
    }

    fn drain_errors(&mut self) {
        while let Ok(message) = self.errors_rx.try_recv() {
            self.error = Some(message);
        }
    }
}

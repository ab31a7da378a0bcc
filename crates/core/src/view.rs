//! Derived view state
//!
//! Pure functions from the live snapshot and the search term to what the
//! list area shows.

use serde::Serialize;

use crate::task::Task;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_MATCHES_MESSAGE: &str = "No matching tasks found.";
pub const NO_TASKS_MESSAGE: &str = "No tasks yet. Add one above!";

/// Which list section a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Completed,
    Pending,
}

impl SectionKind {
    pub fn title(&self, count: usize) -> String {
        match self {
            Self::Completed => format!("Completed ({})", count),
            Self::Pending => format!("To Do ({})", count),
        }
    }
}

/// Tasks split by completion, both in list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    pub completed: Vec<&'a Task>,
    pub pending: Vec<&'a Task>,
}

impl Partition<'_> {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.pending.is_empty()
    }
}

/// What the list area displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState<'a> {
    Loading,
    Empty { message: &'static str },
    Sections(Partition<'a>),
}

/// Keep the tasks whose text contains `term`, ignoring case
pub fn filter_tasks<'a>(tasks: &'a [Task], term: &str) -> Vec<&'a Task> {
    let term = term.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.text.to_lowercase().contains(&term))
        .collect()
}

/// Split filtered tasks into completed and pending
pub fn partition<'a>(tasks: &[&'a Task]) -> Partition<'a> {
    let (completed, pending): (Vec<&'a Task>, Vec<&'a Task>) =
        tasks.iter().copied().partition(|task| task.is_completed);
    Partition { completed, pending }
}

/// Apply the display policy to a live snapshot
///
/// A search term counts as active whenever it is non-empty, whitespace
/// included.
pub fn list_state<'a>(snapshot: Option<&'a [Task]>, search: &str) -> ListState<'a> {
    let Some(tasks) = snapshot else {
        return ListState::Loading;
    };

    let filtered = filter_tasks(tasks, search);
    if filtered.is_empty() {
        let message = if search.is_empty() {
            NO_TASKS_MESSAGE
        } else {
            NO_MATCHES_MESSAGE
        };
        return ListState::Empty { message };
    }

    ListState::Sections(partition(&filtered))
}

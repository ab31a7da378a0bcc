//! Headless presentation layer
//!
//! The root component, its rows, the new-task form and the edit state
//! machine. Nothing here draws; front ends render the [`Screen`] model.

mod app;
mod edit;
mod form;
mod item;

pub use app::{
    ListView, Screen, SectionView, TodoApp, ADD_TASK_LABEL, NEW_TASK_PLACEHOLDER,
    SEARCH_PLACEHOLDER, SUBTITLE, TITLE,
};
pub use edit::{EditSlot, EditState, Key, SaveRequest};
pub use form::NewTaskForm;
pub use item::{dispatch, ItemView, RowIntent};

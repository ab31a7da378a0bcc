//! Core library for the task list
//!
//! This crate contains the core business logic, including:
//! - The task model and the live item store
//! - The data access layer used by every front end
//! - Derived view state, the edit state machine and the theme reader
//! - A headless presentation component that ties them together

pub mod api;
pub mod error;
pub mod live;
pub mod task;
pub mod theme;
pub mod ui;
pub mod view;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

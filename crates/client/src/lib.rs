//! HTTP data access layer for the task list
//!
//! [`HttpTaskApi`] implements the core [`TaskApi`](todo_core::api::TaskApi)
//! against a running `todo-server`, following the live list over its
//! Server-Sent-Events stream.

mod http;
pub mod sse;

pub use http::{ClientConfig, HttpTaskApi, API_URL_ENV, DEFAULT_API_URL};

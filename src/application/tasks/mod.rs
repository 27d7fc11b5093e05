//! Task use-cases: creation, edits, submissions and dashboard queries.

pub mod queries;
pub mod service;

pub use queries::TaskStats;
pub use service::TaskService;

//! # TaskDesk
//!
//! Local data and state engine for a role-based task assignment dashboard
//! (admin, manager, employee).
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **domain**: users, tasks with their status state machine,
//!   conversations, repository traits
//! - **application**: identity, task and chat use-cases, session gate,
//!   unread badge
//! - **infrastructure**: storage backends (memory, files), typed JSON
//!   tables, repository implementations, password hashing
//! - **notifications**: process-wide change notifier
//! - **runtime**: the `TaskDesk` handle that wires everything together

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod runtime;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use domain::{DomainError, DomainResult};

pub use notifications::{create_change_notifier, ChangeEvent, ChangeKind, SharedChangeNotifier};

pub use runtime::{init_tracing, TaskDesk, TaskDeskOptions};

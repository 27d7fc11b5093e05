//! Identity module: user management and the per-view session gate.
//!
//! `IdentityService` owns every use-case touching the users collection
//! (seeding, login, registration, profile edits, deletion). `SessionGate`
//! holds who is signed in for one view and persists it for views opened
//! later.

pub mod service;
pub mod session;

pub use service::IdentityService;
pub use session::{Session, SessionGate};

//! Application layer: use-cases over the repository tables.
//!
//! Every mutating call follows the same sequence: simulated latency, one
//! table read-modify-write, then a change event.

pub mod chat;
pub mod identity;
pub mod tasks;

pub use chat::{ChatService, ConversationSummary, UnreadBadge};
pub use identity::{IdentityService, Session, SessionGate};
pub use tasks::{TaskService, TaskStats};

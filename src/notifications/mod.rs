//! Change notifications
//!
//! Views that show persisted state subscribe here and re-read whenever the
//! collection they depend on changes.
//!
//! # Usage
//! ```ignore
//! use taskdesk::notifications::{create_change_notifier, ChangeEvent, ChangeKind};
//! use taskdesk::domain::Collection;
//!
//! let notifier = create_change_notifier();
//! let mut subscriber = notifier.subscribe();
//! notifier.publish(ChangeEvent::local(Collection::Tasks, ChangeKind::Created, "t1"));
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_change_notifier, ChangeNotifier, ChangeSubscriber, SharedChangeNotifier};
pub use events::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A persisted collection. Each is an independent unit of atomicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Tasks,
    Conversations,
    Session,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Tasks,
        Collection::Conversations,
        Collection::Session,
    ];

    /// Namespaced key under which the collection is persisted.
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Self::Users => "task_tracker_users",
            Self::Tasks => "task_tracker_tasks",
            Self::Conversations => "shared_chat_history",
            Self::Session => "task_tracker_current_user",
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.storage_key() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tasks => "tasks",
            Self::Conversations => "conversations",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

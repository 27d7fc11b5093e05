//! Change events
//!
//! A change event says "this collection changed, re-read it". The kind and
//! entity id are advisory, for logging and for subscribers that want to
//! skip irrelevant collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Submitted,
    MessageSent,
    MessagesRead,
    SignedIn,
    SignedOut,
    /// Written by another process sharing the same storage.
    External,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Submitted => "submitted",
            Self::MessageSent => "message_sent",
            Self::MessagesRead => "messages_read",
            Self::SignedIn => "signed_in",
            Self::SignedOut => "signed_out",
            Self::External => "external",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// Published by a handle in this process.
    Local,
    /// Detected on storage, written by someone else.
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub collection: Collection,
    pub kind: ChangeKind,
    pub entity_id: Option<String>,
    pub origin: ChangeOrigin,
}

impl ChangeEvent {
    pub fn local(collection: Collection, kind: ChangeKind, entity_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            collection,
            kind,
            entity_id: Some(entity_id.into()),
            origin: ChangeOrigin::Local,
        }
    }

    pub fn external(collection: Collection) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            collection,
            kind: ChangeKind::External,
            entity_id: None,
            origin: ChangeOrigin::External,
        }
    }

    pub fn affects(&self, collection: Collection) -> bool {
        self.collection == collection
    }
}

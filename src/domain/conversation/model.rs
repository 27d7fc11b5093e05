use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key of the conversation between two users. Order-independent:
/// the ids are sorted before joining.
pub fn conversation_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}-{b}")
    } else {
        format!("{b}-{a}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender_id: String,
    /// Display-formatted send time
    pub time: String,
    #[serde(default)]
    pub sent_at: DateTime<Utc>,
    /// Set once the recipient opens the conversation.
    pub read: bool,
}

/// Message thread between exactly two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub participants: [String; 2],
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(a: &str, b: &str) -> Self {
        Self {
            id: conversation_id(a, b),
            participants: [a.to_string(), b.to_string()],
            messages: Vec::new(),
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// The other participant, if `user_id` takes part at all.
    pub fn peer_of(&self, user_id: &str) -> Option<&str> {
        match &self.participants {
            [a, b] if a == user_id => Some(b.as_str()),
            [a, b] if b == user_id => Some(a.as_str()),
            _ => None,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages addressed to `user_id` that they have not read yet.
    pub fn unread_for(&self, user_id: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender_id != user_id && !m.read)
            .count()
    }

    /// Flip `read` on every unread message not sent by `reader_id`.
    /// Returns how many messages changed.
    pub fn mark_read_by(&mut self, reader_id: &str) -> usize {
        let mut changed = 0;
        for message in self.messages.iter_mut() {
            if message.sender_id != reader_id && !message.read {
                message.read = true;
                changed += 1;
            }
        }
        changed
    }
}

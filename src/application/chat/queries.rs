use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{conversation_id, Conversation, PublicUser};

/// One row of the conversation list: a peer and the state of the thread
/// with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub peer_id: String,
    pub peer_name: String,
    pub conversation_id: String,
    pub last_message: Option<String>,
    pub last_time: Option<String>,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub unread: usize,
    pub last_from_me: bool,
}

impl ConversationSummary {
    pub fn build(user_id: &str, peer: &PublicUser, conversation: Option<&Conversation>) -> Self {
        let last = conversation.and_then(Conversation::last_message);
        Self {
            peer_id: peer.id.clone(),
            peer_name: peer.name.clone(),
            conversation_id: conversation_id(user_id, &peer.id),
            last_message: last.map(|m| m.text.clone()),
            last_time: last.map(|m| m.time.clone()),
            last_sent_at: last.map(|m| m.sent_at),
            unread: conversation.map_or(0, |c| c.unread_for(user_id)),
            last_from_me: last.is_some_and(|m| m.sender_id == user_id),
        }
    }
}

/// Most recent thread first; peers without messages keep their given order
/// at the end.
pub fn sort_summaries(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|a, b| b.last_sent_at.cmp(&a.last_sent_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, UserRole};
    use chrono::TimeZone;

    fn peer(id: &str) -> PublicUser {
        PublicUser {
            id: id.into(),
            name: format!("User {id}"),
            email: format!("{id}@x.com"),
            role: UserRole::Employee,
            avatar: String::new(),
            created_at: Utc::now(),
        }
    }

    fn message(sender: &str, text: &str, minute: u32) -> Message {
        Message {
            id: format!("{sender}-{minute}"),
            text: text.into(),
            sender_id: sender.into(),
            time: format!("10:{minute:02} AM"),
            sent_at: Utc.with_ymd_and_hms(2026, 1, 1, 10, minute, 0).unwrap(),
            read: false,
        }
    }

    #[test]
    fn summary_without_conversation() {
        let summary = ConversationSummary::build("u1", &peer("u2"), None);
        assert_eq!(summary.conversation_id, "u1-u2");
        assert_eq!(summary.unread, 0);
        assert!(summary.last_message.is_none());
        assert!(!summary.last_from_me);
    }

    #[test]
    fn summary_reflects_last_message_and_unread() {
        let mut convo = Conversation::new("u1", "u2");
        convo.messages.push(message("u2", "hello", 1));
        convo.messages.push(message("u2", "you there?", 2));
        convo.messages.push(message("u1", "yes", 3));

        let mine = ConversationSummary::build("u1", &peer("u2"), Some(&convo));
        assert_eq!(mine.last_message.as_deref(), Some("yes"));
        assert_eq!(mine.last_time.as_deref(), Some("10:03 AM"));
        assert_eq!(mine.unread, 2);
        assert!(mine.last_from_me);

        let theirs = ConversationSummary::build("u2", &peer("u1"), Some(&convo));
        assert_eq!(theirs.unread, 1);
        assert!(!theirs.last_from_me);
    }

    #[test]
    fn most_recent_first_then_silent_peers() {
        let mut old = Conversation::new("u1", "u2");
        old.messages.push(message("u2", "old", 1));
        let mut new = Conversation::new("u1", "u3");
        new.messages.push(message("u3", "new", 5));

        let mut rows = vec![
            ConversationSummary::build("u1", &peer("u4"), None),
            ConversationSummary::build("u1", &peer("u2"), Some(&old)),
            ConversationSummary::build("u1", &peer("u3"), Some(&new)),
        ];
        sort_summaries(&mut rows);

        let order: Vec<_> = rows.iter().map(|r| r.peer_id.as_str()).collect();
        assert_eq!(order, vec!["u3", "u2", "u4"]);
    }
}

//! Live unread badge.
//!
//! Keeps a user's unread count current by re-counting on every
//! conversations change. Readers get the value through a watch channel.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ChatService;
use crate::domain::{Collection, DomainResult};

pub struct UnreadBadge {
    user_id: String,
    receiver: watch::Receiver<usize>,
    handle: JoinHandle<()>,
}

impl UnreadBadge {
    /// Start tracking `user_id`. The returned badge already holds the
    /// current count. The background task stops when the badge is dropped.
    pub async fn spawn(chat: Arc<ChatService>, user_id: impl Into<String>) -> DomainResult<Self> {
        let user_id = user_id.into();
        let mut subscriber = chat.notifier().subscribe();
        let initial = chat.unread_count(&user_id).await?;
        let (sender, receiver) = watch::channel(initial);

        let task_user = user_id.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = subscriber.recv().await {
                if !event.affects(Collection::Conversations) {
                    continue;
                }
                match chat.unread_count(&task_user).await {
                    Ok(count) => {
                        sender.send_if_modified(|current| {
                            if *current == count {
                                return false;
                            }
                            *current = count;
                            true
                        });
                    }
                    Err(e) => warn!(user_id = %task_user, error = %e, "Failed to recount unread messages"),
                }
            }
            debug!(user_id = %task_user, "Unread badge stopped");
        });

        Ok(Self {
            user_id,
            receiver,
            handle,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn get(&self) -> usize {
        *self.receiver.borrow()
    }

    /// Wait for the count to change. `false` once the badge has stopped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// An extra receiver for another view.
    pub fn watch(&self) -> watch::Receiver<usize> {
        self.receiver.clone()
    }
}

impl Drop for UnreadBadge {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

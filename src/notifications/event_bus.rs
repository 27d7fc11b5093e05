//! Change notifier
//!
//! Process-wide broadcast of [`ChangeEvent`]s over a tokio broadcast
//! channel. Every mutating service call publishes after its write, so a
//! subscriber that re-reads on receipt sees the writer's result.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::events::ChangeEvent;

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let collection = event.collection.as_str();
        let kind = event.kind.as_str();
        metrics::counter!("taskdesk_change_events_total", "collection" => collection).increment(1);

        match self.sender.send(event) {
            Ok(count) => {
                debug!(collection, kind, subscribers = count, "Change published");
            }
            Err(_) => {
                debug!(collection, kind, "Change published (no subscribers)");
            }
        }
    }

    pub fn subscribe(&self) -> ChangeSubscriber {
        let receiver = self.sender.subscribe();
        let count = self.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(total = count, "New change subscriber");

        ChangeSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChangeSubscriber {
    receiver: broadcast::Receiver<ChangeEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl ChangeSubscriber {
    /// Next event, or `None` once every notifier handle is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(missed = count, "Change subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(missed = count, "Change subscriber lagged");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }

    /// Discard everything published so far.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.try_recv().is_some() {
            drained += 1;
        }
        drained
    }
}

impl Drop for ChangeSubscriber {
    fn drop(&mut self) {
        let prev = self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
        info!(remaining = prev.saturating_sub(1), "Change subscriber disconnected");
    }
}

pub type SharedChangeNotifier = Arc<ChangeNotifier>;

pub fn create_change_notifier() -> SharedChangeNotifier {
    Arc::new(ChangeNotifier::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Collection;
    use crate::notifications::events::ChangeKind;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.publish(ChangeEvent::local(Collection::Tasks, ChangeKind::Created, "t1"));

        for subscriber in [&mut first, &mut second] {
            let received = tokio::time::timeout(std::time::Duration::from_millis(100), subscriber.recv())
                .await
                .expect("Timeout")
                .expect("No message");
            assert_eq!(received.collection, Collection::Tasks);
            assert_eq!(received.entity_id.as_deref(), Some("t1"));
        }
    }

    #[test]
    fn try_recv_sees_only_events_after_subscribe() {
        let notifier = ChangeNotifier::new();
        notifier.publish(ChangeEvent::external(Collection::Users));

        let mut subscriber = notifier.subscribe();
        assert!(subscriber.try_recv().is_none());

        notifier.publish(ChangeEvent::external(Collection::Users));
        notifier.publish(ChangeEvent::external(Collection::Conversations));
        assert_eq!(subscriber.drain(), 2);
    }

    #[test]
    fn test_subscriber_count() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.subscriber_count(), 0);

        let sub1 = notifier.subscribe();
        let _sub2 = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        drop(sub1);
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn recv_ends_when_notifier_is_dropped() {
        let notifier = ChangeNotifier::new();
        let mut subscriber = notifier.subscribe();
        drop(notifier);
        assert!(subscriber.recv().await.is_none());
    }
}

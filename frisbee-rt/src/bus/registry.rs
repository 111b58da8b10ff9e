//! Fan-out subscription registry.
//!
//! Maps exact fan-out keys (`messages:<actor>`, `return:<actor>`) to the
//! mailbox of the one connector subscribed to each. Delivery is
//! at-most-once by construction: a key has at most one mailbox, and a
//! payload is moved into it or dropped.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::BusError;
use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender};
use crate::message::Subscription;

/// Lock-free registry of fan-out subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: DashMap<String, MailboxSender<Bytes>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a subscription, handing back the receiving half.
    pub fn subscribe(&self, subscription: Subscription) -> Result<MailboxReceiver<Bytes>, BusError> {
        let key = subscription.key();
        if self.subscriptions.contains_key(&key) {
            return Err(BusError::DuplicateSubscription(key));
        }
        let (tx, rx) = mailbox();
        self.subscriptions.insert(key, tx);
        Ok(rx)
    }

    /// Remove a subscription; pending items in its mailbox are dropped with
    /// the receiver.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.subscriptions.remove(&subscription.key());
    }

    /// Deliver a payload to the matching subscriber, if any.
    ///
    /// Returns `false` when there is no live subscriber; a dead mailbox is
    /// pruned on the way out.
    pub fn deliver(&self, subscription: &Subscription, payload: Bytes) -> bool {
        let key = subscription.key();
        match self.subscriptions.get(&key) {
            Some(sender) => {
                if sender.send(payload).is_ok() {
                    true
                } else {
                    drop(sender);
                    self.subscriptions.remove(&key);
                    false
                }
            }
            None => false,
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use frisbee_lang::ActorId;

    #[tokio::test]
    async fn test_subscribe_and_deliver() {
        let registry = SubscriptionRegistry::new();
        let actor = ActorId::new();
        let mut rx = registry.subscribe(Subscription::Messages(actor)).unwrap();

        assert!(registry.deliver(&Subscription::Messages(actor), Bytes::from_static(b"hi")));
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"hi"));
    }

    #[test]
    fn test_duplicate_subscription_rejected() {
        let registry = SubscriptionRegistry::new();
        let actor = ActorId::new();

        registry.subscribe(Subscription::Messages(actor)).unwrap();
        assert!(matches!(
            registry.subscribe(Subscription::Messages(actor)),
            Err(BusError::DuplicateSubscription(_))
        ));
    }

    #[test]
    fn test_deliver_without_subscriber_is_false() {
        let registry = SubscriptionRegistry::new();

        assert!(!registry.deliver(
            &Subscription::Returns(ActorId::new()),
            Bytes::from_static(b"x")
        ));
    }

    #[test]
    fn test_dead_subscriber_is_pruned() {
        let registry = SubscriptionRegistry::new();
        let actor = ActorId::new();
        let rx = registry.subscribe(Subscription::Messages(actor)).unwrap();
        drop(rx);

        assert!(!registry.deliver(&Subscription::Messages(actor), Bytes::from_static(b"x")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_messages_and_returns_are_distinct_keys() {
        let registry = SubscriptionRegistry::new();
        let actor = ActorId::new();

        registry.subscribe(Subscription::Messages(actor)).unwrap();
        registry.subscribe(Subscription::Returns(actor)).unwrap();

        assert_eq!(registry.len(), 2);
    }
}

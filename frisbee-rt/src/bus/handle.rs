//! The cloneable publisher handle connectors and the bootstrap hold.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::error::BusError;
use super::registry::SubscriptionRegistry;
use super::switch::BusEvent;
use crate::mailbox::MailboxReceiver;
use crate::message::{Subscription, Topic};

/// Cheap-clone handle onto one environment's bus: publish into the fan-in
/// queue, subscribe on the fan-out registry.
#[derive(Debug, Clone)]
pub struct BusHandle {
    env_name: Arc<str>,
    ingress: mpsc::UnboundedSender<BusEvent>,
    registry: Arc<SubscriptionRegistry>,
}

impl BusHandle {
    pub(crate) fn new(
        env_name: &str,
        ingress: mpsc::UnboundedSender<BusEvent>,
        registry: Arc<SubscriptionRegistry>,
    ) -> Self {
        Self {
            env_name: Arc::from(env_name),
            ingress,
            registry,
        }
    }

    /// The name of the environment this bus serves.
    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Install a fan-out subscription.
    pub fn subscribe(&self, subscription: Subscription) -> Result<MailboxReceiver<Bytes>, BusError> {
        self.registry.subscribe(subscription)
    }

    /// Remove a fan-out subscription.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.registry.unsubscribe(subscription);
    }

    /// Publish one payload under a routed topic.
    pub fn publish(&self, topic: Topic, payload: Bytes) -> Result<(), BusError> {
        self.ingress
            .send(BusEvent::Publication { topic, payload })
            .map_err(|_| BusError::Closed)
    }
}

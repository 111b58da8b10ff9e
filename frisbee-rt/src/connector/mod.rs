//! The per-actor bus client.
//!
//! Bound at actor start to a fresh actor id. Holds the actor's two fan-out
//! subscriptions - `messages:<self>` for inbound envelopes and
//! `return:<self>` for replies to its own requests - and publishes through
//! the shared fan-in handle. Delivery of any published envelope is
//! at-most-once per matching subscriber, and order between one sender and
//! one recipient is preserved; nothing is promised across senders.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use crate::bus::{BusError, BusHandle};
use crate::mailbox::MailboxReceiver;
use crate::message::{Envelope, Reply, ReturnAddress, Subscription, Topic};
use crate::util::CorrelationId;
use frisbee_lang::{ActorId, Proxy, RuntimeError, Value};

/// One dequeued envelope, decoded.
#[derive(Debug)]
pub struct IncomingMessage {
    pub name: String,
    pub args: Vec<Value>,
    pub reply_to: Option<ReturnAddress>,
}

/// An actor's connection to its environment bus.
#[derive(Debug)]
pub struct ActorConnector {
    actor_id: ActorId,
    bus: BusHandle,
    messages: MailboxReceiver<Bytes>,
    returns: MailboxReceiver<Bytes>,
}

impl ActorConnector {
    /// Mint a fresh actor id, install both subscriptions and announce the
    /// actor to the bus.
    pub fn attach(bus: &BusHandle) -> Result<Self, BusError> {
        let actor_id = ActorId::new();
        let messages = bus.subscribe(Subscription::Messages(actor_id))?;
        let returns = bus.subscribe(Subscription::Returns(actor_id))?;
        bus.publish(Topic::Create { actor: actor_id }, Bytes::new())?;
        debug!(actor = %actor_id, env = bus.env_name(), "connector attached");
        Ok(Self {
            actor_id,
            bus: bus.clone(),
            messages,
            returns,
        })
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn env_name(&self) -> &str {
        self.bus.env_name()
    }

    /// The proxy other actors use to reach this one.
    pub fn proxy(&self) -> Proxy {
        Proxy {
            actor_id: self.actor_id,
            home_env: self.bus.env_name().to_string(),
        }
    }

    /// Block until one envelope arrives on the messages subscription.
    ///
    /// Malformed payloads are logged and skipped; `None` means the bus is
    /// gone and the actor should stop.
    pub async fn receive_message(&mut self) -> Option<IncomingMessage> {
        loop {
            let payload = self.messages.recv().await?;
            match Envelope::from_bytes(&payload) {
                Ok(envelope) => {
                    return Some(IncomingMessage {
                        name: envelope.name,
                        args: envelope.args,
                        reply_to: envelope.reply_to,
                    });
                }
                Err(e) => warn!(actor = %self.actor_id, error = %e, "skipping bad envelope"),
            }
        }
    }

    /// Block until the reply correlated with `correlation` arrives on the
    /// return subscription.
    ///
    /// A reply with a foreign correlation id is a protocol error (the
    /// return subscription is dedicated to this actor); it is logged and
    /// skipped rather than delivered to the wrong wait.
    pub async fn receive_return_value(&mut self, correlation: CorrelationId) -> Option<Value> {
        loop {
            let payload = self.returns.recv().await?;
            match Reply::from_bytes(&payload) {
                Ok(reply) if reply.correlation == correlation => return Some(reply.value),
                Ok(reply) => warn!(
                    actor = %self.actor_id,
                    expected = %correlation,
                    received = %reply.correlation,
                    "skipping reply with foreign correlation id"
                ),
                Err(e) => warn!(actor = %self.actor_id, error = %e, "skipping bad reply"),
            }
        }
    }

    /// Publish an envelope to `dest`. With `reply` set, the envelope asks
    /// the recipient to answer on this actor's return topic.
    pub fn send_message(
        &self,
        dest: &Proxy,
        name: &str,
        args: Vec<Value>,
        reply: Option<CorrelationId>,
    ) -> Result<(), RuntimeError> {
        let envelope = match reply {
            Some(correlation) => Envelope::request(
                name,
                args,
                ReturnAddress {
                    actor_id: self.actor_id,
                    env: self.bus.env_name().to_string(),
                    correlation,
                },
            ),
            None => Envelope::message(name, args),
        };
        let topic = Topic::Message {
            actor: dest.actor_id,
            env: dest.home_env.clone(),
        };
        self.bus
            .publish(topic, envelope.to_bytes()?)
            .map_err(|e| RuntimeError::Transport(e.to_string()))
    }

    /// Publish a reply to a request's return address.
    pub fn return_result(&self, to: &ReturnAddress, value: Value) -> Result<(), RuntimeError> {
        let reply = Reply::new(value, to.correlation);
        let topic = Topic::Return {
            actor: to.actor_id,
            env: to.env.clone(),
        };
        self.bus
            .publish(topic, reply.to_bytes()?)
            .map_err(|e| RuntimeError::Transport(e.to_string()))
    }

    /// Drop both subscriptions. Called when the actor stops.
    pub fn detach(&self) {
        self.bus.unsubscribe(&Subscription::Messages(self.actor_id));
        self.bus.unsubscribe(&Subscription::Returns(self.actor_id));
    }
}

impl Drop for ActorConnector {
    fn drop(&mut self) {
        self.detach();
    }
}

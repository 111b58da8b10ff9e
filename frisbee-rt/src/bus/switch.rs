//! The switch: one event loop per environment.
//!
//! A single consumer dequeues publications from the local fan-in and from
//! every peer reader task, then classifies by topic: local destinations are
//! republished on the fan-out registry, remote ones are forwarded over the
//! peer link named in the topic (dialed on demand), and the two control
//! topics update the switch's bookkeeping. Forwarding is best-effort - a
//! publication that cannot reach its peer is dropped and logged.

// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

// Layer 3: Internal module imports
use super::error::BusError;
use super::peer::{self, PeerLink};
use super::registry::SubscriptionRegistry;
use crate::message::{frame, Topic};
use crate::system::Topology;
use frisbee_lang::ActorId;

/// One item on the switch's fan-in queue.
#[derive(Debug)]
pub enum BusEvent {
    /// A routed publication from a local connector or a peer reader.
    Publication { topic: Topic, payload: Bytes },
    /// A peer link negotiated by the control listener.
    PeerAttached {
        env: String,
        main: Option<ActorId>,
        link: PeerLink,
    },
}

/// Bus state read outside the switch loop: the control listener answers
/// handshakes from it.
#[derive(Debug, Default)]
pub struct BusShared {
    main_actor: RwLock<Option<ActorId>>,
    other_mains: RwLock<HashMap<String, ActorId>>,
}

impl BusShared {
    pub fn new() -> Self {
        Self::default()
    }

    /// The program's root actor, once announced.
    pub fn main_actor(&self) -> Option<ActorId> {
        *self.main_actor.read()
    }

    /// Snapshot of peer environment -> peer main actor.
    pub fn other_mains(&self) -> HashMap<String, ActorId> {
        self.other_mains.read().clone()
    }

    fn record_main(&self, actor: ActorId) {
        *self.main_actor.write() = Some(actor);
    }

    fn record_peer_main(&self, env: &str, actor: ActorId) {
        self.other_mains.write().insert(env.to_string(), actor);
    }
}

/// The per-environment switch.
pub struct BusSwitch {
    env_name: String,
    topology: Topology,
    registry: Arc<SubscriptionRegistry>,
    shared: Arc<BusShared>,
    /// Handed to peer reader tasks so their publications join the fan-in.
    ingress_tx: mpsc::UnboundedSender<BusEvent>,
    ingress: mpsc::UnboundedReceiver<BusEvent>,
    peers: HashMap<String, PeerLink>,
    /// Actor ids hosted in this environment.
    local_actors: HashSet<ActorId>,
    /// Actor id -> peer environment, learned from link negotiations.
    peer_of_actor: HashMap<ActorId, String>,
}

impl BusSwitch {
    pub fn new(
        env_name: &str,
        topology: Topology,
        registry: Arc<SubscriptionRegistry>,
        shared: Arc<BusShared>,
        ingress_tx: mpsc::UnboundedSender<BusEvent>,
        ingress: mpsc::UnboundedReceiver<BusEvent>,
    ) -> Self {
        Self {
            env_name: env_name.to_string(),
            topology,
            registry,
            shared,
            ingress_tx,
            ingress,
            peers: HashMap::new(),
            local_actors: HashSet::new(),
            peer_of_actor: HashMap::new(),
        }
    }

    /// Dial configured peers, then run the event loop until every handle is
    /// dropped.
    pub async fn run(mut self) {
        self.connect_configured_peers().await;
        while let Some(event) = self.ingress.recv().await {
            self.handle_event(event).await;
        }
        debug!(env = %self.env_name, "bus switch stopped");
    }

    /// Startup connections from the topology. A peer that is not up yet is
    /// not fatal; the link is dialed again on demand.
    async fn connect_configured_peers(&mut self) {
        let connections = match self.topology.environment(&self.env_name) {
            Ok(spec) => spec.connections.clone(),
            Err(_) => return,
        };
        for peer in connections {
            if let Err(e) = self.ensure_peer(&peer).await {
                warn!(peer = %peer, error = %e, "startup connection failed; will retry on demand");
            }
        }
    }

    async fn handle_event(&mut self, event: BusEvent) {
        match event {
            BusEvent::Publication { topic, payload } => self.route(topic, payload).await,
            BusEvent::PeerAttached { env, main, link } => {
                if let Some(main) = main {
                    self.shared.record_peer_main(&env, main);
                    self.peer_of_actor.insert(main, env.clone());
                }
                debug!(peer = %env, "peer link attached");
                self.peers.insert(env, link);
            }
        }
    }

    async fn route(&mut self, topic: Topic, payload: Bytes) {
        trace!(topic = %topic, bytes = payload.len(), "routing");
        match &topic {
            Topic::Main { actor } => {
                self.shared.record_main(*actor);
                self.local_actors.insert(*actor);
                debug!(main = %actor, "main actor announced");
            }
            Topic::Create { actor } => {
                self.local_actors.insert(*actor);
            }
            Topic::Message { actor, env } | Topic::Return { actor, env } => {
                if env == &self.env_name {
                    self.deliver_local(&topic, payload);
                } else {
                    let (actor, env) = (*actor, env.clone());
                    self.forward(actor, &env, &topic, payload).await;
                }
            }
        }
    }

    fn deliver_local(&mut self, topic: &Topic, payload: Bytes) {
        let Some(subscription) = topic.subscription() else {
            return;
        };
        if !self.registry.deliver(&subscription, payload) {
            warn!(topic = %topic, "no subscriber; dropping publication");
        }
    }

    async fn forward(&mut self, actor: ActorId, env: &str, topic: &Topic, payload: Bytes) {
        let encoded = frame::encode(topic, &payload);

        let link_env = if self.peers.contains_key(env) || self.topology.environment(env).is_ok() {
            env.to_string()
        } else if let Some(via) = self.peer_of_actor.get(&actor) {
            // Unknown environment, but the actor's home was learned from a
            // negotiation: route through the link that introduced it.
            via.clone()
        } else {
            warn!(topic = %topic, peer = env, "no route to peer; dropping publication");
            return;
        };

        match self.ensure_peer(&link_env).await {
            Ok(link) => {
                if link.send(encoded).is_err() {
                    warn!(peer = %link_env, topic = %topic, "peer link closed; dropping publication");
                    self.peers.remove(&link_env);
                }
            }
            Err(e) => {
                warn!(peer = %link_env, topic = %topic, error = %e, "cannot forward; dropping publication");
            }
        }
    }

    /// The link to `env`, dialing it first if none is attached yet.
    async fn ensure_peer(&mut self, env: &str) -> Result<PeerLink, BusError> {
        if self.peers.get(env).is_some_and(|link| link.is_closed()) {
            self.peers.remove(env);
        }
        if let Some(link) = self.peers.get(env) {
            return Ok(link.clone());
        }
        let (link, main) =
            peer::dial(env, &self.topology, &self.env_name, self.ingress_tx.clone()).await?;
        if let Some(main) = main {
            self.shared.record_peer_main(env, main);
            self.peer_of_actor.insert(main, env.to_string());
        }
        self.peers.insert(env.to_string(), link.clone());
        Ok(link)
    }
}

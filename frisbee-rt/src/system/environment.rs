//! Environment bootstrap and program startup.
//!
//! `Environment::start` brings one process's bus to life: it binds the
//! control listener, spawns the switch (which dials the configured peers),
//! and serves `init`/`remote:` handshakes. `run_program` then links a type
//! table into a runtime context, spawns the `Main` active object, announces
//! it, and injects the initial `run` message - from there on, every action
//! is a reaction to a dequeued envelope.

// Layer 1: Standard library imports
use std::net::SocketAddr;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

// Layer 3: Internal module imports
use super::config::Topology;
use super::error::SystemError;
use crate::actor::RuntimeHandle;
use crate::builtin::IoSink;
use crate::bus::{peer, BusHandle, BusShared, BusSwitch, ListenerCtx, SubscriptionRegistry};
use crate::message::{Envelope, Topic};
use frisbee_lang::{ActorId, Declaration, ObjectKind, Proxy, TypeTable};

/// The root active object every program must declare.
pub const MAIN_OBJECT: &str = "Main";

/// The message injected to start the program.
pub const RUN_METHOD: &str = "run";

/// One running environment: its bus, its control listener, its name.
pub struct Environment {
    name: String,
    bus: BusHandle,
    shared: Arc<BusShared>,
    io: IoSink,
    local_addr: SocketAddr,
    switch_task: JoinHandle<()>,
    accept_task: JoinHandle<()>,
}

impl Environment {
    /// Start the environment named `name` from the topology, printing io to
    /// stdout.
    pub async fn start(name: &str, topology: Topology) -> Result<Self, SystemError> {
        Self::start_with_io(name, topology, IoSink::stdout()).await
    }

    /// Start with an explicit io sink (embedders, tests).
    pub async fn start_with_io(
        name: &str,
        topology: Topology,
        io: IoSink,
    ) -> Result<Self, SystemError> {
        topology.validate()?;
        let spec = topology.environment(name)?.clone();

        let listener = TcpListener::bind(spec.addr().as_str())
            .await
            .map_err(|source| SystemError::Bind {
                addr: spec.addr(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| SystemError::Bind {
            addr: spec.addr(),
            source,
        })?;

        let registry = Arc::new(SubscriptionRegistry::new());
        let shared = Arc::new(BusShared::new());
        let (ingress_tx, ingress_rx) = mpsc::unbounded_channel();
        let bus = BusHandle::new(name, ingress_tx.clone(), Arc::clone(&registry));

        let listener_ctx = ListenerCtx::new(
            name,
            local_addr.port(),
            Arc::clone(&shared),
            ingress_tx.clone(),
        );
        let accept_task = tokio::spawn(peer::accept_loop(listener, listener_ctx));

        let switch = BusSwitch::new(
            name,
            topology,
            registry,
            Arc::clone(&shared),
            ingress_tx,
            ingress_rx,
        );
        let switch_task = tokio::spawn(switch.run());

        info!(env = name, addr = %local_addr, "environment started");
        Ok(Self {
            name: name.to_string(),
            bus,
            shared,
            io,
            local_addr,
            switch_task,
            accept_task,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bus(&self) -> &BusHandle {
        &self.bus
    }

    /// Where the control listener actually bound (port 0 resolves here).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The root actor, once a program announced it.
    pub fn main_actor(&self) -> Option<ActorId> {
        self.shared.main_actor()
    }

    /// Build the per-actor runtime context for a linked program.
    pub fn runtime(&self, types: TypeTable) -> RuntimeHandle {
        RuntimeHandle::new(Arc::new(types), self.bus.clone(), self.io.clone())
    }

    /// Spawn `Main` from `main_module`, announce it, and inject `run`.
    pub async fn run_program(
        &self,
        types: TypeTable,
        main_module: &str,
    ) -> Result<(RuntimeHandle, Proxy), SystemError> {
        let runtime = self.runtime(types);
        let declaration = runtime
            .resolve(main_module, MAIN_OBJECT)
            .map_err(|_| SystemError::NoMainObject(main_module.to_string()))?
            .clone();
        let Declaration::Object(decl) = declaration else {
            return Err(SystemError::NoMainObject(main_module.to_string()));
        };
        if decl.kind != ObjectKind::Active {
            return Err(SystemError::NoMainObject(main_module.to_string()));
        }

        let proxy = runtime.spawn_active(decl, vec![])?;
        self.bus.publish(
            Topic::Main {
                actor: proxy.actor_id,
            },
            Bytes::new(),
        )?;

        let run = Envelope::message(RUN_METHOD, vec![]);
        self.bus.publish(
            Topic::Message {
                actor: proxy.actor_id,
                env: self.name.clone(),
            },
            run.to_bytes()?,
        )?;

        info!(env = %self.name, main = %proxy.actor_id, "program started");
        Ok((runtime, proxy))
    }

    /// Stop the switch and the control listener. Actor tasks stop on their
    /// own once the bus is gone.
    pub fn shutdown(&self) {
        self.switch_task.abort();
        self.accept_task.abort();
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.shutdown();
    }
}

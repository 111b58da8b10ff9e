//! The actor host and the per-actor runtime context.
//!
//! Spawning installs the connector's subscriptions *before* the task
//! starts, so the returned proxy is routable immediately and nothing sent
//! to it can race past the receive loop. The loop itself is the contract
//! from the hosting model: dequeue, proceed, reply if asked to.
//!
//! [`RuntimeHandle`] is the reified per-actor context that replaces any
//! process-global state: the linked type table, the bus handle and the io
//! sink, shared by cheap clone with every actor of the environment.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::{debug, error};

// Layer 3: Internal module imports
use super::lifecycle::{ActorLifecycle, ActorState};
use super::object::{active_fields, ActiveObject, ActorCtx, ScriptedObject};
use crate::builtin::{self, IoSink};
use crate::bus::BusHandle;
use crate::connector::ActorConnector;
use frisbee_lang::{
    ActiveInstance, Declaration, ObjectDecl, ObjectKind, Proxy, RuntimeError, TypeTable, Value,
};

/// Per-environment runtime context handed to every actor.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Arc<RuntimeInner>,
}

struct RuntimeInner {
    types: Arc<TypeTable>,
    bus: BusHandle,
    io: IoSink,
}

impl RuntimeHandle {
    pub fn new(types: Arc<TypeTable>, bus: BusHandle, io: IoSink) -> Self {
        Self {
            inner: Arc::new(RuntimeInner { types, bus, io }),
        }
    }

    pub fn types(&self) -> &TypeTable {
        &self.inner.types
    }

    pub fn bus(&self) -> &BusHandle {
        &self.inner.bus
    }

    pub fn env_name(&self) -> &str {
        self.inner.bus.env_name()
    }

    pub fn io(&self) -> &IoSink {
        &self.inner.io
    }

    /// Resolve a `(module, typename)` pair to its declaration.
    pub fn resolve(&self, module: &str, typename: &str) -> Result<&Declaration, RuntimeError> {
        self.inner.types.resolve(module, typename)
    }

    /// `spawn T(args)` for a scripted declaration: host a fresh actor and
    /// hand back its proxy.
    pub fn spawn_active(
        &self,
        decl: Arc<ObjectDecl>,
        args: Vec<Value>,
    ) -> Result<Proxy, RuntimeError> {
        if decl.kind != ObjectKind::Active {
            return Err(RuntimeError::TypeError(format!(
                "cannot spawn passive type {}",
                decl.qualified_name()
            )));
        }
        let connector = ActorConnector::attach(self.bus())
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;
        let module = decl.module.clone().unwrap_or_else(|| "?".to_string());
        let instance = Arc::new(ActiveInstance::new(
            module,
            decl.name.clone(),
            connector.actor_id(),
            self.env_name().to_string(),
            active_fields(&decl, args)?,
        ));
        let object = ScriptedObject::new(decl, instance);
        Ok(self.spawn_object(Box::new(object), connector))
    }

    /// Spawn a builtin declaration.
    pub fn spawn_builtin(
        &self,
        module: &str,
        typename: &str,
        args: Vec<Value>,
    ) -> Result<Proxy, RuntimeError> {
        let object = builtin::instantiate(module, typename, args)?;
        let connector = ActorConnector::attach(self.bus())
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;
        Ok(self.spawn_object(object, connector))
    }

    /// Host an already-built behaviour on a fresh task.
    ///
    /// The connector's subscriptions already exist, so the proxy is valid
    /// before the task runs its first instruction.
    pub fn spawn_object(
        &self,
        object: Box<dyn ActiveObject>,
        connector: ActorConnector,
    ) -> Proxy {
        let proxy = connector.proxy();
        tokio::spawn(run_actor(object, connector, self.clone()));
        proxy
    }
}

/// The receive loop: one per hosted actor.
async fn run_actor(
    mut object: Box<dyn ActiveObject>,
    mut connector: ActorConnector,
    runtime: RuntimeHandle,
) {
    let label = object.label();
    let actor_id = connector.actor_id();
    let mut lifecycle = ActorLifecycle::new();
    debug!(actor = %actor_id, %label, "actor starting");

    {
        let mut ctx = ActorCtx {
            connector: &mut connector,
            runtime: &runtime,
            lifecycle: &mut lifecycle,
        };
        if let Err(e) = object.on_start(&mut ctx).await {
            error!(actor = %actor_id, %label, error = %e, "actor failed to start");
            lifecycle.transition_to(ActorState::Failed);
            return;
        }
    }
    lifecycle.transition_to(ActorState::Idle);

    while let Some(incoming) = connector.receive_message().await {
        lifecycle.transition_to(ActorState::Handling);
        let reply_to = incoming.reply_to.clone();

        let result = {
            let mut ctx = ActorCtx {
                connector: &mut connector,
                runtime: &runtime,
                lifecycle: &mut lifecycle,
            };
            object
                .proceed_message(&incoming.name, incoming.args, &mut ctx)
                .await
        };

        match result {
            Ok(value) => {
                if let Some(address) = reply_to {
                    if let Err(e) = connector.return_result(&address, value) {
                        error!(actor = %actor_id, %label, error = %e, "reply failed");
                    }
                }
            }
            Err(e) => {
                // A runtime error terminates this actor; the bus and every
                // other actor keep running.
                error!(
                    actor = %actor_id,
                    %label,
                    message = %incoming.name,
                    error = %e,
                    "actor terminated by runtime error"
                );
                lifecycle.transition_to(ActorState::Failed);
                return;
            }
        }
        lifecycle.transition_to(ActorState::Idle);
    }
    debug!(actor = %actor_id, %label, "actor stopped");
}

//! Actor hosting.
//!
//! The behaviour seam ([`ActiveObject`]), the host that runs one actor per
//! tokio task ([`host`]), and the explicit actor state machine
//! ([`lifecycle`]).

pub mod host;
pub mod lifecycle;
pub mod object;

pub use host::RuntimeHandle;
pub use lifecycle::{ActorLifecycle, ActorState};
pub use object::{create_passive, ActiveObject, ActorCtx, ScriptedObject};

//! # frisbee-rt - Distributed Actor Runtime for the Frisbee Language
//!
//! One process running this runtime is an **environment**: it hosts a set of
//! actors, switches messages between them, and bridges to peer environments
//! over TCP so a program can span several processes on several hosts.
//!
//! # Architecture
//!
//! ```text
//! actor task ── connector ──▶ fan-in ─▶ bus switch ─▶ fan-out ── connector ──▶ actor task
//!                                          │ ▲
//!                                    peer links (TCP)
//!                                          ▼ │
//!                                   peer environments
//! ```
//!
//! Every actor runs as its own tokio task with a single-threaded
//! [`eval::Evaluator`] walking its method bodies. Actors own no shared
//! object graph; the only way in or out is a message envelope published on
//! the environment bus. Topics whose destination environment is not the
//! local one are forwarded over a long-lived peer link, opened on demand.
//!
//! # Module Organization
//!
//! - [`message`] - Envelopes, routed topics and the peer frame format
//! - [`mailbox`] - Per-subscription queues between the bus and actors
//! - [`bus`] - The per-environment switch and its peer bridge
//! - [`connector`] - An actor's client of the bus
//! - [`actor`] - The behaviour seam, the host loop and the state machine
//! - [`eval`] - The AST-walking evaluator
//! - [`builtin`] - Native active objects (`sockets`) and the `io` singleton
//! - [`system`] - Topology configuration and environment bootstrap
//! - [`util`] - Correlation ids

pub mod actor;
pub mod builtin;
pub mod bus;
pub mod connector;
pub mod eval;
pub mod mailbox;
pub mod message;
pub mod prelude;
pub mod system;
pub mod util;

// Re-export commonly used types
pub use actor::{ActiveObject, ActorCtx, ActorLifecycle, ActorState, RuntimeHandle};
pub use builtin::IoSink;
pub use bus::{BusError, BusHandle};
pub use connector::{ActorConnector, IncomingMessage};
pub use message::{Envelope, Reply, ReturnAddress, Subscription, Topic};
pub use system::{Environment, EnvironmentSpec, SystemError, Topology};
pub use util::CorrelationId;

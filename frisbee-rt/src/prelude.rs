//! Convenience re-exports for embedding the runtime.
//!
//! ```rust,ignore
//! use frisbee_rt::prelude::*;
//! ```

pub use crate::actor::{ActiveObject, ActorCtx, RuntimeHandle};
pub use crate::builtin::IoSink;
pub use crate::bus::BusHandle;
pub use crate::connector::ActorConnector;
pub use crate::message::{Envelope, Topic};
pub use crate::system::{Environment, SystemError, Topology};
pub use frisbee_lang::{ActorId, Loader, Proxy, RuntimeError, TypeTable, Value};

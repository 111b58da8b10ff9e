//! The environment bus.
//!
//! Exactly one per process: a local publish/subscribe fabric plus
//! point-to-point links to peer environments. Local actors publish into a
//! single fan-in queue; the switch consumes it, republishes topics whose
//! destination environment is the local one, and forwards the rest over the
//! peer link named in the topic, opening the connection on demand.

pub mod error;
pub mod handle;
pub mod peer;
pub mod registry;
pub mod switch;

pub use error::BusError;
pub use handle::BusHandle;
pub use peer::{ListenerCtx, PeerLink};
pub use registry::SubscriptionRegistry;
pub use switch::{BusEvent, BusShared, BusSwitch};

//! Message envelopes, routed topics and the peer frame format.

pub mod envelope;
pub mod frame;
pub mod topic;

pub use envelope::{Envelope, Reply, ReturnAddress};
pub use topic::{Subscription, Topic, TopicError};

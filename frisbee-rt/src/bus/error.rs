// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Bus failures.
///
/// Forwarding is best-effort: a publication that cannot reach its peer is
/// dropped and logged, so most of these surface only at the call sites that
/// establish links or subscriptions.
#[derive(Debug, Error)]
pub enum BusError {
    /// The switch's event loop is gone; nothing can be published any more.
    #[error("bus has stopped")]
    Closed,

    /// A second subscription for the same fan-out key.
    #[error("duplicate subscription `{0}`")]
    DuplicateSubscription(String),

    /// A routed topic names an environment this one has no way to reach.
    #[error("unknown peer environment `{0}`")]
    UnknownPeer(String),

    /// The peer is configured but did not accept a connection.
    #[error("cannot reach peer `{env}`: {reason}")]
    PeerUnreachable { env: String, reason: String },

    /// Link negotiation failed.
    #[error("handshake failed: {0}")]
    Handshake(String),
}

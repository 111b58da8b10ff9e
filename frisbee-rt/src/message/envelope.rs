//! The message envelope and its reply counterpart.
//!
//! An envelope is `{name, args, return}`: the method to run, its argument
//! values, and - for request/reply - where the result should go. Replies
//! travel on the caller's return topic as a bare value plus the request's
//! correlation id. Both forms are encoded as canonical JSON; values are
//! deep-copied by the encoding, so nothing shared ever crosses a boundary.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::CorrelationId;
use frisbee_lang::{ActorId, RuntimeError, Value};

/// Where a reply should be delivered: the caller's id, the caller's home
/// environment (which names the return topic), and the request's
/// correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnAddress {
    pub actor_id: ActorId,
    pub env: String,
    pub correlation: CorrelationId,
}

/// One routed message: `{name, args, return}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    pub args: Vec<Value>,
    #[serde(rename = "return")]
    pub reply_to: Option<ReturnAddress>,
}

impl Envelope {
    /// Fire-and-forget envelope.
    pub fn message(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            reply_to: None,
        }
    }

    /// Request envelope awaiting a reply at `reply_to`.
    pub fn request(name: impl Into<String>, args: Vec<Value>, reply_to: ReturnAddress) -> Self {
        Self {
            name: name.into(),
            args,
            reply_to: Some(reply_to),
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes, RuntimeError> {
        let encoded = serde_json::to_vec(self)
            .map_err(|e| RuntimeError::Protocol(format!("cannot encode envelope: {e}")))?;
        Ok(Bytes::from(encoded))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuntimeError> {
        serde_json::from_slice(bytes)
            .map_err(|e| RuntimeError::Protocol(format!("malformed envelope: {e}")))
    }
}

/// A reply: the result value echoing its request's correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub value: Value,
    pub correlation: CorrelationId,
}

impl Reply {
    pub fn new(value: Value, correlation: CorrelationId) -> Self {
        Self { value, correlation }
    }

    pub fn to_bytes(&self) -> Result<Bytes, RuntimeError> {
        let encoded = serde_json::to_vec(self)
            .map_err(|e| RuntimeError::Protocol(format!("cannot encode reply: {e}")))?;
        Ok(Bytes::from(encoded))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuntimeError> {
        serde_json::from_slice(bytes)
            .map_err(|e| RuntimeError::Protocol(format!("malformed reply: {e}")))
    }
}

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::str::FromStr;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for actors across every environment of a program.
///
/// Minted once by the hosting environment when an actor is spawned; every
/// proxy and every routed topic carries the same id, so it must be globally
/// unique. UUID v4 gives that without coordination between environments.
///
/// # Example
/// ```rust
/// use frisbee_lang::ActorId;
///
/// let id1 = ActorId::new();
/// let id2 = ActorId::new();
/// assert_ne!(id1, id2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a new random ActorId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create ActorId from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_uniqueness() {
        let id1 = ActorId::new();
        let id2 = ActorId::new();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_actor_id_round_trips_through_display() {
        let id = ActorId::new();
        let parsed: ActorId = id.to_string().parse().unwrap();

        assert_eq!(id, parsed);
    }

    #[test]
    fn test_actor_id_serde_is_bare_uuid() {
        let id = ActorId::new();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{id}\""));
    }
}

//! Actor state machine.
//!
//! Tracks where one actor is between suspension points, for diagnostics.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tracing::trace;

// Layer 3: Internal module imports
// (none)

/// Actor state between suspension points.
///
/// # State Transitions
///
/// ```text
/// Spawning -> Idle -> Handling -> Idle
///                        |   ^
///                        v   |
///                   AwaitingReply
/// ```
///
/// Statements execute only in Handling and AwaitingReply; a reply envelope
/// is consumed only in AwaitingReply. Envelopes arriving in any other state
/// queue in the subscription mailbox. A runtime error moves the actor to
/// Failed and its task exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActorState {
    /// Host allocated, connector not yet draining.
    #[default]
    Spawning,

    /// Blocked at the top of the receive loop.
    Idle,

    /// Running a method body for one dequeued message.
    Handling,

    /// A wait statement is blocked on the reply topic.
    AwaitingReply,

    /// A runtime error terminated the actor.
    Failed,
}

/// Lifecycle tracker carried through one actor's host loop.
#[derive(Debug, Clone, Default)]
pub struct ActorLifecycle {
    state: ActorState,
    transitions: u64,
}

impl ActorLifecycle {
    /// New tracker in Spawning state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    /// Number of transitions so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn transition_to(&mut self, state: ActorState) {
        trace!(from = ?self.state, to = ?state, "actor state transition");
        self.state = state;
        self.transitions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_spawning() {
        let lifecycle = ActorLifecycle::new();

        assert_eq!(lifecycle.state(), ActorState::Spawning);
        assert_eq!(lifecycle.transitions(), 0);
    }

    #[test]
    fn test_transitions_are_counted() {
        let mut lifecycle = ActorLifecycle::new();

        lifecycle.transition_to(ActorState::Idle);
        lifecycle.transition_to(ActorState::Handling);
        lifecycle.transition_to(ActorState::AwaitingReply);
        lifecycle.transition_to(ActorState::Handling);
        lifecycle.transition_to(ActorState::Idle);

        assert_eq!(lifecycle.state(), ActorState::Idle);
        assert_eq!(lifecycle.transitions(), 5);
    }
}

//! Routing keys.
//!
//! Routed topics travel between environments and carry the destination
//! environment so the switch can decide local-publish versus forward:
//! `message:<actor>:<env>` and `return:<actor>:<env>`. The two control
//! topics `main:<actor>` and `create:<actor>` never leave the environment.
//! On the in-process fan-out side, subscriptions use the shorter keys
//! `messages:<actor>` and `return:<actor>`.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::str::FromStr;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use frisbee_lang::ActorId;

/// A routed topic as it appears on the wire between environments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A message for `actor`, hosted in `env`.
    Message { actor: ActorId, env: String },
    /// A reply for `actor`, hosted in `env`.
    Return { actor: ActorId, env: String },
    /// Announces the program's root actor. Local to one environment.
    Main { actor: ActorId },
    /// Announces a freshly hosted actor. Local to one environment.
    Create { actor: ActorId },
}

impl Topic {
    /// The destination environment, for topics that are routed at all.
    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Message { env, .. } | Self::Return { env, .. } => Some(env),
            Self::Main { .. } | Self::Create { .. } => None,
        }
    }

    /// The fan-out subscription a local delivery of this topic resolves to.
    pub fn subscription(&self) -> Option<Subscription> {
        match self {
            Self::Message { actor, .. } => Some(Subscription::Messages(*actor)),
            Self::Return { actor, .. } => Some(Subscription::Returns(*actor)),
            Self::Main { .. } | Self::Create { .. } => None,
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { actor, env } => write!(f, "message:{actor}:{env}"),
            Self::Return { actor, env } => write!(f, "return:{actor}:{env}"),
            Self::Main { actor } => write!(f, "main:{actor}"),
            Self::Create { actor } => write!(f, "create:{actor}"),
        }
    }
}

/// Topic parse failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("malformed topic `{0}`")]
    Malformed(String),

    #[error("bad actor id in topic `{0}`")]
    BadActorId(String),
}

impl FromStr for Topic {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TopicError::Malformed(s.to_string());
        let (kind, rest) = s.split_once(':').ok_or_else(malformed)?;
        let actor_of = |text: &str| {
            text.parse::<ActorId>()
                .map_err(|_| TopicError::BadActorId(s.to_string()))
        };
        match kind {
            "message" | "return" => {
                let (actor, env) = rest.split_once(':').ok_or_else(malformed)?;
                if env.is_empty() {
                    return Err(malformed());
                }
                let actor = actor_of(actor)?;
                let env = env.to_string();
                Ok(if kind == "message" {
                    Self::Message { actor, env }
                } else {
                    Self::Return { actor, env }
                })
            }
            "main" => Ok(Self::Main {
                actor: actor_of(rest)?,
            }),
            "create" => Ok(Self::Create {
                actor: actor_of(rest)?,
            }),
            _ => Err(malformed()),
        }
    }
}

/// A fan-out subscription key: what one connector listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// `messages:<actor>` - inbound envelopes.
    Messages(ActorId),
    /// `return:<actor>` - replies to this actor's requests.
    Returns(ActorId),
}

impl Subscription {
    /// The registry key subscribers are selected by (exact match).
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Messages(actor) => write!(f, "messages:{actor}"),
            Self::Returns(actor) => write!(f, "return:{actor}"),
        }
    }
}

// Layer 1: Standard library imports
use std::path::PathBuf;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::bus::BusError;
use frisbee_lang::{LoadError, RuntimeError};

/// Failures while configuring or bootstrapping an environment.
#[derive(Debug, Error)]
pub enum SystemError {
    /// The topology file could not be read.
    #[error("cannot read config `{path}`: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The topology file is not valid YAML of the expected shape.
    #[error("invalid config `{path}`: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// The requested environment name is missing from the topology.
    #[error("environment `{0}` missing from configuration")]
    UnknownEnvironment(String),

    /// An environment lists a connection to an undeclared peer.
    #[error("environment `{env}` connects to undeclared environment `{peer}`")]
    UnknownConnection { env: String, peer: String },

    /// The control port could not be bound.
    #[error("cannot bind control port {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The entry module declares no `Main` active object.
    #[error("no Main active object in module `{0}`")]
    NoMainObject(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

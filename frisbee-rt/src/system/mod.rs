//! Environment configuration and bootstrap.

pub mod config;
pub mod environment;
pub mod error;

pub use config::{EnvironmentSpec, Topology};
pub use environment::{Environment, MAIN_OBJECT, RUN_METHOD};
pub use error::SystemError;

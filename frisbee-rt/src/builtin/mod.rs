//! Native object types.
//!
//! The behaviour behind the builtin declarations the loader links against:
//! the `sockets` module's TCP objects and the ambient `io` singleton.

pub mod io;
pub mod sockets;

pub use io::IoSink;

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::object::ActiveObject;
use frisbee_lang::builtins::{SOCKETS_MODULE, TCP_CONNECTION_TYPE, TCP_SERVER_TYPE};
use frisbee_lang::{RuntimeError, Value};

/// Build the native behaviour behind a builtin declaration.
pub fn instantiate(
    module: &str,
    typename: &str,
    args: Vec<Value>,
) -> Result<Box<dyn ActiveObject>, RuntimeError> {
    match (module, typename) {
        (SOCKETS_MODULE, TCP_SERVER_TYPE) => Ok(Box::new(sockets::TcpServerObject::new(args)?)),
        (SOCKETS_MODULE, TCP_CONNECTION_TYPE) => Err(RuntimeError::TypeError(format!(
            "{SOCKETS_MODULE}.{TCP_CONNECTION_TYPE} is produced by accept(), not spawned"
        ))),
        (module, typename) => Err(RuntimeError::Protocol(format!(
            "unknown builtin type {module}.{typename}"
        ))),
    }
}

//! Error taxonomy shared by the loader and the runtime.
//!
//! Load-time errors abort the program with the offending file and reason;
//! runtime errors terminate the actor that raised them while the rest of the
//! environment keeps running.

// Layer 1: Standard library imports
use std::path::PathBuf;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::ast::decode::DecodeError;

/// Errors raised while loading and linking the module graph.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An imported module could not be located.
    #[error("module `{module}` not found at {path}")]
    ModuleNotFound { module: String, path: PathBuf },

    /// The front-end parser rejected a source file.
    #[error("parse failure in `{file}`: {reason}")]
    Parse { file: String, reason: String },

    /// The parser output could not be decoded into an AST.
    #[error("{file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: DecodeError,
    },

    /// A constructor names a type that is neither local nor imported.
    #[error("type `{typename}` is not in scope in module `{module}`")]
    TypeNotImported { module: String, typename: String },

    /// Two declarations share the same `(module, typename)` pair.
    #[error("duplicate declaration `{module}.{typename}`")]
    DuplicateDeclaration { module: String, typename: String },

    /// A source file could not be read.
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while evaluating method bodies or handling messages.
///
/// The variants follow the kinds a frisbee program can fail with at run
/// time: unbound identifiers, operator/kind mismatches, array bounds,
/// missing fields or methods, unresolved types, malformed envelopes and
/// transport failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Identifier not bound in the current activation frame.
    #[error("unbound name `{0}`")]
    UnboundName(String),

    /// Operator applied to incompatible kinds, or a kind-level misuse such
    /// as field access on a remote actor reference.
    #[error("type error: {0}")]
    TypeError(String),

    /// Array index outside `[0, len)`.
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    /// Field read on an instance that does not carry the field.
    #[error("no field `{field}` on {object}")]
    NoField { object: String, field: String },

    /// Method lookup failed on the receiver's declaration.
    #[error("no method `{method}` on {object}")]
    NoMethod { object: String, method: String },

    /// A constructor resolved to a `(module, typename)` pair with no
    /// declaration behind it.
    #[error("unknown type {module}.{typename}")]
    UnknownType { module: String, typename: String },

    /// A message envelope could not be decoded, or a builtin received a
    /// message it does not understand.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The bus or a peer link failed while publishing.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RuntimeError {
    /// Shorthand for the pervasive operator-kind mismatch.
    pub fn kind_mismatch(op: &str, left: &str, right: &str) -> Self {
        Self::TypeError(format!("`{op}` not defined for {left} and {right}"))
    }
}

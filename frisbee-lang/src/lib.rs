//! # frisbee-lang - Language Core for the Frisbee Actor Language
//!
//! Data definitions shared by every part of the frisbee toolchain: the AST
//! produced by the front-end parser, the runtime value model, the canonical
//! wire encoding of values, and the module loader/linker.
//!
//! The crate is deliberately runtime-agnostic: it knows about actor ids and
//! remote proxies because those are *values* of the language, but it never
//! touches sockets or tasks. The distributed runtime lives in `frisbee-rt`.
//!
//! # Module Organization
//!
//! - [`ast`] - Tagged sum types for expressions, statements and declarations,
//!   plus the decoder for the parser tool's s-expression output
//! - [`sexpr`] - Reader for the s-expression rendering itself
//! - [`value`] - Runtime values: primitives, arrays, object instances,
//!   remote actor proxies
//! - [`wire`] - Canonical serialisation of values and the deep-copy rules
//!   applied at process boundaries
//! - [`loader`] - Module graph loading, builtin satisfaction and the
//!   constructor scope rewrite
//! - [`builtins`] - Names of the statically provided builtin modules
//! - [`ids`] - Actor identifiers
//! - [`error`] - Load-time and run-time error taxonomy

pub mod ast;
pub mod builtins;
pub mod error;
pub mod ids;
pub mod loader;
pub mod sexpr;
pub mod value;
pub mod wire;

// Re-export commonly used types
pub use ast::{
    BinOp, CmpOp, Expr, Formal, ImportDecl, MethodDecl, ObjectDecl, ObjectKind, Program, Stmt,
    TypeNode,
};
pub use error::{LoadError, RuntimeError};
pub use ids::ActorId;
pub use loader::{Declaration, Loader, ProgramParser, StaticParser, ToolParser, TypeTable};
pub use value::{ActiveInstance, PassiveInstance, Proxy, Value};
pub use wire::WireValue;

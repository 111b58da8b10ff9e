//! AST of the frisbee language.
//!
//! Tagged sum types with explicit recursion; the runtime walks these trees
//! directly, there is no further lowering. Constructor nodes (`new`/`spawn`)
//! carry an optional module tag written by the loader's scope rewrite.

pub mod decl;
pub mod decode;
pub mod expr;
pub mod module;
pub mod stmt;
pub mod types;

pub use decl::{Formal, MethodDecl, ObjectDecl, ObjectKind};
pub use decode::{decode_program, DecodeError};
pub use expr::{BinOp, CmpOp, Expr};
pub use module::{ImportDecl, Program};
pub use stmt::Stmt;
pub use types::TypeNode;

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::expr::Expr;
use super::types::TypeNode;

/// A statement node.
///
/// Statement lists run head-to-tail and short-circuit as soon as the
/// activation's return slot is set.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Braced statement list.
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    /// Sets the activation's return slot; enclosing lists stop.
    Return(Expr),
    /// `x = e`, with the declared type when the source had one.
    Assign {
        ty: Option<TypeNode>,
        name: String,
        expr: Expr,
    },
    /// `e.f = e'`
    AssignField {
        object: Expr,
        field: String,
        expr: Expr,
    },
    /// `a[i] = e'` where `a` is a frame binding.
    AssignIndex {
        name: String,
        index: Expr,
        expr: Expr,
    },
    /// Bare declaration; a no-op at run time.
    VarDecl { ty: TypeNode, name: String },
    /// `obj ! m(args)` - fire-and-forget message.
    Send {
        object: Expr,
        method: String,
        args: Vec<Expr>,
    },
    /// `x = obj ? m(args)` - request and block for the reply.
    Wait {
        binding: String,
        object: Expr,
        method: String,
        args: Vec<Expr>,
    },
    /// Expression evaluated for effect.
    Expr(Expr),
}

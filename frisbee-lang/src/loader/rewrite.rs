//! The constructor scope rewrite.
//!
//! After a module is parsed, every `new T(…)` and `spawn T(…)` node in its
//! method bodies is tagged with the module that declares `T`, resolved
//! through the module's scope: imported names first, shadowed by local
//! declarations. The rewrite is idempotent - re-running it over an already
//! tagged tree writes the same tags.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::ast::{Expr, ObjectDecl, Stmt};
use crate::error::LoadError;

/// Tag every constructor in `decl` with the declaring module of its
/// typename. `scope` maps typename to module; `module` names the module
/// being linked, for error reporting.
pub(crate) fn resolve_constructors(
    decl: &mut ObjectDecl,
    scope: &HashMap<String, String>,
    module: &str,
) -> Result<(), LoadError> {
    for method in &mut decl.methods {
        for stmt in &mut method.body {
            rewrite_stmt(stmt, scope, module)?;
        }
    }
    Ok(())
}

fn rewrite_stmt(
    stmt: &mut Stmt,
    scope: &HashMap<String, String>,
    module: &str,
) -> Result<(), LoadError> {
    match stmt {
        Stmt::Block(statements) => {
            for s in statements {
                rewrite_stmt(s, scope, module)?;
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            rewrite_expr(condition, scope, module)?;
            rewrite_stmt(then_branch, scope, module)?;
            rewrite_stmt(else_branch, scope, module)?;
        }
        Stmt::While { condition, body } => {
            rewrite_expr(condition, scope, module)?;
            rewrite_stmt(body, scope, module)?;
        }
        Stmt::Return(expr) | Stmt::Expr(expr) => rewrite_expr(expr, scope, module)?,
        Stmt::Assign { expr, .. } => rewrite_expr(expr, scope, module)?,
        Stmt::AssignField { object, expr, .. } => {
            rewrite_expr(object, scope, module)?;
            rewrite_expr(expr, scope, module)?;
        }
        Stmt::AssignIndex { index, expr, .. } => {
            rewrite_expr(index, scope, module)?;
            rewrite_expr(expr, scope, module)?;
        }
        Stmt::VarDecl { .. } => {}
        Stmt::Send { object, args, .. } => {
            rewrite_expr(object, scope, module)?;
            for arg in args {
                rewrite_expr(arg, scope, module)?;
            }
        }
        Stmt::Wait { object, args, .. } => {
            rewrite_expr(object, scope, module)?;
            for arg in args {
                rewrite_expr(arg, scope, module)?;
            }
        }
    }
    Ok(())
}

fn rewrite_expr(
    expr: &mut Expr,
    scope: &HashMap<String, String>,
    module: &str,
) -> Result<(), LoadError> {
    match expr {
        Expr::Int(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Void
        | Expr::This
        | Expr::Io
        | Expr::Ident(_) => {}
        Expr::Binary { left, right, .. } | Expr::Compare { left, right, .. } => {
            rewrite_expr(left, scope, module)?;
            rewrite_expr(right, scope, module)?;
        }
        Expr::Not(operand) => rewrite_expr(operand, scope, module)?,
        Expr::Array(items) => {
            for item in items {
                rewrite_expr(item, scope, module)?;
            }
        }
        Expr::Index { array, index } => {
            rewrite_expr(array, scope, module)?;
            rewrite_expr(index, scope, module)?;
        }
        Expr::Field { object, .. } => rewrite_expr(object, scope, module)?,
        Expr::Call { object, args, .. } => {
            rewrite_expr(object, scope, module)?;
            for arg in args {
                rewrite_expr(arg, scope, module)?;
            }
        }
        Expr::NewPassive {
            module: tag,
            typename,
            args,
        }
        | Expr::Spawn {
            module: tag,
            typename,
            args,
        } => {
            let declaring =
                scope
                    .get(typename.as_str())
                    .ok_or_else(|| LoadError::TypeNotImported {
                        module: module.to_string(),
                        typename: typename.clone(),
                    })?;
            *tag = Some(declaring.clone());
            for arg in args {
                rewrite_expr(arg, scope, module)?;
            }
        }
    }
    Ok(())
}

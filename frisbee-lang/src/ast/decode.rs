//! Typed decoder from the parser tool's s-expressions into the AST.
//!
//! The front-end emits one node per AST constructor, with child order fixed
//! by the constructor's field order. Lists (imports, methods, statements,
//! arguments) arrive as head/tail cons chains terminated by an `…Empty`
//! node; the decoder flattens them into vectors.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use super::decl::{Formal, MethodDecl, ObjectDecl, ObjectKind};
use super::expr::{BinOp, CmpOp, Expr};
use super::module::{ImportDecl, Program};
use super::stmt::Stmt;
use super::types::TypeNode;
use crate::sexpr::Sexpr;

/// Decoder failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown node tag `{0}`")]
    UnknownTag(String),

    #[error("node `{tag}` expects {expected} fields, found {found}")]
    Arity {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("expected a tagged node, found string `{0}`")]
    ExpectedNode(String),

    #[error("invalid integer literal `{0}`")]
    InvalidInt(String),

    #[error("invalid boolean literal `{0}`")]
    InvalidBool(String),

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("expected a name, found `{0}`")]
    ExpectedName(String),
}

/// Decode a whole parsed source file.
pub fn decode_program(sx: &Sexpr) -> Result<Program, DecodeError> {
    let node = Node::of(sx)?;
    node.expect("Program", 2)?;
    Ok(Program {
        imports: decode_imports(node.field(0)?)?,
        objects: decode_objects(node.field(1)?)?,
    })
}

/// A tagged node: list head names the constructor, the rest are fields.
/// Nullary constructors may arrive as bare atoms.
struct Node<'a> {
    tag: &'a str,
    fields: &'a [Sexpr],
}

impl<'a> Node<'a> {
    fn of(sx: &'a Sexpr) -> Result<Self, DecodeError> {
        match sx {
            Sexpr::Atom(tag) => Ok(Self { tag, fields: &[] }),
            Sexpr::Str(s) => Err(DecodeError::ExpectedNode(s.clone())),
            Sexpr::List(items) => match items.split_first() {
                Some((Sexpr::Atom(tag), fields)) => Ok(Self { tag, fields }),
                _ => Err(DecodeError::ExpectedNode(sx.to_string())),
            },
        }
    }

    fn expect(&self, tag: &str, arity: usize) -> Result<(), DecodeError> {
        if self.tag != tag {
            return Err(DecodeError::UnknownTag(self.tag.to_string()));
        }
        self.arity(arity)
    }

    fn arity(&self, expected: usize) -> Result<(), DecodeError> {
        if self.fields.len() != expected {
            return Err(DecodeError::Arity {
                tag: self.tag.to_string(),
                expected,
                found: self.fields.len(),
            });
        }
        Ok(())
    }

    fn field(&self, index: usize) -> Result<&'a Sexpr, DecodeError> {
        self.fields.get(index).ok_or_else(|| DecodeError::Arity {
            tag: self.tag.to_string(),
            expected: index + 1,
            found: self.fields.len(),
        })
    }
}

/// Names arrive quoted from the tool, but bare atoms are accepted too.
fn decode_name(sx: &Sexpr) -> Result<String, DecodeError> {
    match sx {
        Sexpr::Str(s) => Ok(s.clone()),
        Sexpr::Atom(a) => Ok(a.clone()),
        Sexpr::List(_) => Err(DecodeError::ExpectedName(sx.to_string())),
    }
}

fn decode_int(sx: &Sexpr) -> Result<i64, DecodeError> {
    let text = match sx {
        Sexpr::Atom(a) => a.as_str(),
        Sexpr::Str(s) => s.as_str(),
        Sexpr::List(_) => return Err(DecodeError::InvalidInt(sx.to_string())),
    };
    text.parse()
        .map_err(|_| DecodeError::InvalidInt(text.to_string()))
}

fn decode_bool(sx: &Sexpr) -> Result<bool, DecodeError> {
    match sx.as_atom() {
        Some("True") => Ok(true),
        Some("False") => Ok(false),
        _ => Err(DecodeError::InvalidBool(sx.to_string())),
    }
}

fn decode_imports(sx: &Sexpr) -> Result<Vec<ImportDecl>, DecodeError> {
    let mut imports = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "ImportDeclList" => {
                node.arity(3)?;
                imports.push(ImportDecl {
                    module: decode_name(node.field(0)?)?,
                    typenames: decode_import_idents(node.field(1)?)?,
                });
                cursor = node.field(2)?;
            }
            "ImportDeclListEmpty" => return Ok(imports),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_import_idents(sx: &Sexpr) -> Result<Vec<String>, DecodeError> {
    let mut names = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "ImportIdentList" => {
                node.arity(2)?;
                names.push(decode_name(node.field(0)?)?);
                cursor = node.field(1)?;
            }
            "ImportIdentListEmpty" => return Ok(names),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_objects(sx: &Sexpr) -> Result<Vec<ObjectDecl>, DecodeError> {
    let mut objects = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "ObjectDeclList" => {
                node.arity(2)?;
                objects.push(decode_decl(node.field(0)?)?);
                cursor = node.field(1)?;
            }
            "OEmpty" => return Ok(objects),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_decl(sx: &Sexpr) -> Result<ObjectDecl, DecodeError> {
    let node = Node::of(sx)?;
    let kind = match node.tag {
        "ActiveDecl" => ObjectKind::Active,
        "PassiveDecl" => ObjectKind::Passive,
        other => return Err(DecodeError::UnknownTag(other.to_string())),
    };
    node.arity(3)?;
    Ok(ObjectDecl {
        kind,
        name: decode_name(node.field(0)?)?,
        fields: decode_var_list(node.field(1)?)?,
        methods: decode_methods(node.field(2)?)?,
        module: None,
    })
}

fn decode_var_list(sx: &Sexpr) -> Result<Vec<Formal>, DecodeError> {
    let mut fields = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "VarDeclList" => {
                node.arity(3)?;
                fields.push(Formal {
                    ty: decode_type(node.field(0)?)?,
                    name: decode_name(node.field(1)?)?,
                });
                cursor = node.field(2)?;
            }
            "VEmpty" => return Ok(fields),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_formals(sx: &Sexpr) -> Result<Vec<Formal>, DecodeError> {
    let mut formals = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "FormalList" => {
                node.arity(3)?;
                formals.push(Formal {
                    ty: decode_type(node.field(0)?)?,
                    name: decode_name(node.field(1)?)?,
                });
                cursor = node.field(2)?;
            }
            "FEmpty" => return Ok(formals),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_methods(sx: &Sexpr) -> Result<Vec<MethodDecl>, DecodeError> {
    let mut methods = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "MethodDeclList" => {
                node.arity(2)?;
                methods.push(decode_method(node.field(0)?)?);
                cursor = node.field(1)?;
            }
            "MEmpty" => return Ok(methods),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_method(sx: &Sexpr) -> Result<MethodDecl, DecodeError> {
    let node = Node::of(sx)?;
    node.expect("MethodDecl", 4)?;
    Ok(MethodDecl {
        return_type: decode_type(node.field(0)?)?,
        name: decode_name(node.field(1)?)?,
        formals: decode_formals(node.field(2)?)?,
        body: decode_stmt_list(node.field(3)?)?,
    })
}

fn decode_type(sx: &Sexpr) -> Result<TypeNode, DecodeError> {
    let node = Node::of(sx)?;
    match node.tag {
        "TypeInt" => Ok(TypeNode::Int),
        "TypeVoid" => Ok(TypeNode::Void),
        "TypeBool" => Ok(TypeNode::Bool),
        "TypeString" => Ok(TypeNode::Str),
        "TypeAnonymous" => Ok(TypeNode::Anonymous),
        "TypeArray" => {
            node.arity(1)?;
            Ok(TypeNode::Array(Box::new(decode_type(node.field(0)?)?)))
        }
        "TypeMaybe" => {
            node.arity(1)?;
            Ok(TypeNode::Maybe(Box::new(decode_type(node.field(0)?)?)))
        }
        "TypeIdent" => {
            node.arity(1)?;
            Ok(TypeNode::Ident(decode_name(node.field(0)?)?))
        }
        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}

fn decode_stmt_list(sx: &Sexpr) -> Result<Vec<Stmt>, DecodeError> {
    let mut statements = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "StatementList" => {
                node.arity(2)?;
                statements.push(decode_stmt(node.field(0)?)?);
                cursor = node.field(1)?;
            }
            "Empty" => return Ok(statements),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_stmt(sx: &Sexpr) -> Result<Stmt, DecodeError> {
    let node = Node::of(sx)?;
    match node.tag {
        "SList" => {
            node.arity(1)?;
            Ok(Stmt::Block(decode_stmt_list(node.field(0)?)?))
        }
        "SIfElse" => {
            node.arity(3)?;
            Ok(Stmt::If {
                condition: decode_expr(node.field(0)?)?,
                then_branch: Box::new(decode_stmt(node.field(1)?)?),
                else_branch: Box::new(decode_stmt(node.field(2)?)?),
            })
        }
        "SWhile" => {
            node.arity(2)?;
            Ok(Stmt::While {
                condition: decode_expr(node.field(0)?)?,
                body: Box::new(decode_stmt(node.field(1)?)?),
            })
        }
        "SReturn" => {
            node.arity(1)?;
            Ok(Stmt::Return(decode_expr(node.field(0)?)?))
        }
        "SEqual" => {
            node.arity(2)?;
            Ok(Stmt::Assign {
                ty: None,
                name: decode_name(node.field(0)?)?,
                expr: decode_expr(node.field(1)?)?,
            })
        }
        "SVarDeclEqual" => {
            node.arity(3)?;
            Ok(Stmt::Assign {
                ty: Some(decode_type(node.field(0)?)?),
                name: decode_name(node.field(1)?)?,
                expr: decode_expr(node.field(2)?)?,
            })
        }
        "SVarDecl" => {
            node.arity(2)?;
            Ok(Stmt::VarDecl {
                ty: decode_type(node.field(0)?)?,
                name: decode_name(node.field(1)?)?,
            })
        }
        "SEqualField" => {
            node.arity(3)?;
            Ok(Stmt::AssignField {
                object: decode_expr(node.field(0)?)?,
                field: decode_name(node.field(1)?)?,
                expr: decode_expr(node.field(2)?)?,
            })
        }
        "SArrayEqual" => {
            node.arity(3)?;
            Ok(Stmt::AssignIndex {
                name: decode_name(node.field(0)?)?,
                index: decode_expr(node.field(1)?)?,
                expr: decode_expr(node.field(2)?)?,
            })
        }
        "SSendMessage" => {
            node.arity(3)?;
            Ok(Stmt::Send {
                object: decode_expr(node.field(0)?)?,
                method: decode_name(node.field(1)?)?,
                args: decode_expr_list(node.field(2)?)?,
            })
        }
        "SWaitMessage" => {
            node.arity(4)?;
            Ok(Stmt::Wait {
                binding: decode_name(node.field(0)?)?,
                object: decode_expr(node.field(1)?)?,
                method: decode_name(node.field(2)?)?,
                args: decode_expr_list(node.field(3)?)?,
            })
        }
        "SExp" => {
            node.arity(1)?;
            Ok(Stmt::Expr(decode_expr(node.field(0)?)?))
        }
        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}

fn decode_expr_list(sx: &Sexpr) -> Result<Vec<Expr>, DecodeError> {
    let mut exprs = Vec::new();
    let mut cursor = sx;
    loop {
        let node = Node::of(cursor)?;
        match node.tag {
            "ExpList" => {
                node.arity(2)?;
                exprs.push(decode_expr(node.field(0)?)?);
                cursor = node.field(1)?;
            }
            "ExpListEmpty" => return Ok(exprs),
            other => return Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn decode_expr(sx: &Sexpr) -> Result<Expr, DecodeError> {
    let node = Node::of(sx)?;
    match node.tag {
        "ExpInt" => {
            node.arity(1)?;
            Ok(Expr::Int(decode_int(node.field(0)?)?))
        }
        "ExpString" => {
            node.arity(1)?;
            Ok(Expr::Str(decode_name(node.field(0)?)?))
        }
        "ExpBool" => {
            node.arity(1)?;
            Ok(Expr::Bool(decode_bool(node.field(0)?)?))
        }
        "ExpVoid" => Ok(Expr::Void),
        "ExpThis" => Ok(Expr::This),
        "ExpIO" => Ok(Expr::Io),
        "ExpIdent" => {
            node.arity(1)?;
            Ok(Expr::Ident(decode_name(node.field(0)?)?))
        }
        "ExpOp" => {
            node.arity(3)?;
            let symbol = decode_name(node.field(1)?)?;
            let op = BinOp::from_symbol(&symbol)
                .ok_or(DecodeError::UnknownOperator(symbol))?;
            Ok(Expr::Binary {
                op,
                left: Box::new(decode_expr(node.field(0)?)?),
                right: Box::new(decode_expr(node.field(2)?)?),
            })
        }
        "ExpComOp" => {
            node.arity(3)?;
            let symbol = decode_name(node.field(1)?)?;
            let op = CmpOp::from_symbol(&symbol)
                .ok_or(DecodeError::UnknownOperator(symbol))?;
            Ok(Expr::Compare {
                op,
                left: Box::new(decode_expr(node.field(0)?)?),
                right: Box::new(decode_expr(node.field(2)?)?),
            })
        }
        "ExpNot" => {
            node.arity(1)?;
            Ok(Expr::Not(Box::new(decode_expr(node.field(0)?)?)))
        }
        "ExpArrayValue" => {
            node.arity(1)?;
            Ok(Expr::Array(decode_expr_list(node.field(0)?)?))
        }
        "ExpArrayGet" => {
            node.arity(2)?;
            Ok(Expr::Index {
                array: Box::new(decode_expr(node.field(0)?)?),
                index: Box::new(decode_expr(node.field(1)?)?),
            })
        }
        "ExpFieldAccess" => {
            node.arity(2)?;
            Ok(Expr::Field {
                object: Box::new(decode_expr(node.field(0)?)?),
                field: decode_name(node.field(1)?)?,
            })
        }
        "ExpFCall" => {
            node.arity(3)?;
            Ok(Expr::Call {
                object: Box::new(decode_expr(node.field(0)?)?),
                method: decode_name(node.field(1)?)?,
                args: decode_expr_list(node.field(2)?)?,
            })
        }
        "ExpNewPassive" => {
            node.arity(2)?;
            Ok(Expr::NewPassive {
                module: None,
                typename: decode_name(node.field(0)?)?,
                args: decode_expr_list(node.field(1)?)?,
            })
        }
        "ExpSpawnActive" => {
            node.arity(2)?;
            Ok(Expr::Spawn {
                module: None,
                typename: decode_name(node.field(0)?)?,
                args: decode_expr_list(node.field(1)?)?,
            })
        }
        // Parenthesised expression; the wrapper is meaningless at run time.
        "ExpExp" => {
            node.arity(1)?;
            decode_expr(node.field(0)?)
        }
        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sexpr;

    fn decode(text: &str) -> Program {
        decode_program(&sexpr::parse(text).unwrap()).unwrap()
    }

    #[test]
    fn test_decode_empty_program() {
        let program = decode("(Program (ImportDeclListEmpty) (OEmpty))");

        assert!(program.imports.is_empty());
        assert!(program.objects.is_empty());
    }

    #[test]
    fn test_decode_imports() {
        let program = decode(
            "(Program \
               (ImportDeclList \"helpers\" \
                 (ImportIdentList \"Counter\" (ImportIdentList \"Node\" (ImportIdentListEmpty))) \
                 (ImportDeclListEmpty)) \
               (OEmpty))",
        );

        assert_eq!(program.imports.len(), 1);
        assert_eq!(program.imports[0].module, "helpers");
        assert_eq!(program.imports[0].typenames, vec!["Counter", "Node"]);
    }

    #[test]
    fn test_decode_passive_declaration() {
        let program = decode(
            "(Program (ImportDeclListEmpty) \
               (ObjectDeclList \
                 (PassiveDecl \"Counter\" \
                   (VarDeclList (TypeInt) \"count\" (VEmpty)) \
                   (MethodDeclList \
                     (MethodDecl (TypeInt) \"get\" (FEmpty) \
                       (StatementList (SReturn (ExpFieldAccess (ExpThis) \"count\")) (Empty))) \
                     (MEmpty))) \
                 (OEmpty)))",
        );

        let decl = &program.objects[0];
        assert_eq!(decl.kind, ObjectKind::Passive);
        assert_eq!(decl.name, "Counter");
        assert_eq!(decl.fields[0].name, "count");
        assert_eq!(decl.module, None);

        let method = decl.method("get").unwrap();
        assert_eq!(method.body.len(), 1);
        assert!(matches!(method.body[0], Stmt::Return(_)));
    }

    #[test]
    fn test_decode_operator_expression() {
        let sx = sexpr::parse("(ExpOp (ExpInt 1) \"+\" (ExpInt 2))").unwrap();
        let expr = decode_expr(&sx).unwrap();

        assert_eq!(
            expr,
            Expr::Binary {
                op: BinOp::Add,
                left: Box::new(Expr::Int(1)),
                right: Box::new(Expr::Int(2)),
            }
        );
    }

    #[test]
    fn test_decode_send_and_wait_statements() {
        let send = sexpr::parse(
            "(SSendMessage (ExpIdent \"w\") \"ping\" (ExpListEmpty))",
        )
        .unwrap();
        assert!(matches!(decode_stmt(&send).unwrap(), Stmt::Send { .. }));

        let wait = sexpr::parse(
            "(SWaitMessage \"x\" (ExpIdent \"w\") \"add\" \
               (ExpList (ExpInt 2) (ExpList (ExpInt 3) (ExpListEmpty))))",
        )
        .unwrap();
        let Stmt::Wait { binding, args, .. } = decode_stmt(&wait).unwrap() else {
            panic!("expected wait statement");
        };
        assert_eq!(binding, "x");
        assert_eq!(args, vec![Expr::Int(2), Expr::Int(3)]);
    }

    #[test]
    fn test_nullary_nodes_accept_bare_atoms() {
        let sx = sexpr::parse("(ExpOp ExpVoid \"==\" (ExpVoid))").unwrap();
        // Tag position treats a bare atom like a zero-field node.
        assert!(decode_expr(&sx).is_err()); // "==" is not a BinOp

        let sx = sexpr::parse("(ExpComOp ExpVoid \"==\" (ExpVoid))").unwrap();
        let expr = decode_expr(&sx).unwrap();
        assert_eq!(
            expr,
            Expr::Compare {
                op: CmpOp::Eq,
                left: Box::new(Expr::Void),
                right: Box::new(Expr::Void),
            }
        );
    }

    #[test]
    fn test_unknown_tag_is_reported() {
        let sx = sexpr::parse("(ExpMystery 1)").unwrap();
        assert_eq!(
            decode_expr(&sx).unwrap_err(),
            DecodeError::UnknownTag("ExpMystery".to_string())
        );
    }

    #[test]
    fn test_arity_mismatch_is_reported() {
        let sx = sexpr::parse("(ExpInt)").unwrap();
        assert!(matches!(
            decode_expr(&sx).unwrap_err(),
            DecodeError::Arity { .. }
        ));
    }

    #[test]
    fn test_spawn_carries_no_module_tag_until_rewrite() {
        let sx = sexpr::parse("(ExpSpawnActive \"Worker\" (ExpListEmpty))").unwrap();
        let Expr::Spawn { module, typename, .. } = decode_expr(&sx).unwrap() else {
            panic!("expected spawn");
        };

        assert_eq!(module, None);
        assert_eq!(typename, "Worker");
    }
}

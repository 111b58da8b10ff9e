//! Shared helpers for runtime integration tests.
//!
//! Test programs are written in the front-end's s-expression output format
//! and fed to the loader through `StaticParser`. The builders below only
//! take care of the cons-list plumbing so programs stay readable.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use frisbee_lang::{Loader, StaticParser, TypeTable};
use frisbee_rt::mailbox::MailboxReceiver;
use frisbee_rt::{Environment, EnvironmentSpec, IoSink, Topology};

/// Fold statements into a `StatementList` chain.
pub fn stmt_list(stmts: &[String]) -> String {
    stmts
        .iter()
        .rev()
        .fold("(Empty)".to_string(), |tail, stmt| {
            format!("(StatementList {stmt} {tail})")
        })
}

/// Fold expressions into an `ExpList` chain.
pub fn exp_list(exprs: &[String]) -> String {
    exprs
        .iter()
        .rev()
        .fold("(ExpListEmpty)".to_string(), |tail, expr| {
            format!("(ExpList {expr} {tail})")
        })
}

/// One method declaration. `formals` are `(type-tag, name)` pairs.
pub fn method(ret: &str, name: &str, formals: &[(&str, &str)], body: &[String]) -> String {
    let formals = formals
        .iter()
        .rev()
        .fold("(FEmpty)".to_string(), |tail, (ty, formal)| {
            format!("(FormalList ({ty}) \"{formal}\" {tail})")
        });
    format!(
        "(MethodDecl ({ret}) \"{name}\" {formals} {})",
        stmt_list(body)
    )
}

fn decl(tag: &str, name: &str, fields: &[(&str, &str)], methods: &[String]) -> String {
    let fields = fields
        .iter()
        .rev()
        .fold("(VEmpty)".to_string(), |tail, (ty, field)| {
            format!("(VarDeclList ({ty}) \"{field}\" {tail})")
        });
    let methods = methods
        .iter()
        .rev()
        .fold("(MEmpty)".to_string(), |tail, m| {
            format!("(MethodDeclList {m} {tail})")
        });
    format!("({tag} \"{name}\" {fields} {methods})")
}

/// An active object declaration.
pub fn active(name: &str, fields: &[(&str, &str)], methods: &[String]) -> String {
    decl("ActiveDecl", name, fields, methods)
}

/// A passive object declaration.
pub fn passive(name: &str, fields: &[(&str, &str)], methods: &[String]) -> String {
    decl("PassiveDecl", name, fields, methods)
}

/// A whole module. `imports` are `(module, typenames)` pairs.
pub fn program(imports: &[(&str, &[&str])], objects: &[String]) -> String {
    let imports = imports
        .iter()
        .rev()
        .fold("(ImportDeclListEmpty)".to_string(), |tail, (module, names)| {
            let idents = names
                .iter()
                .rev()
                .fold("(ImportIdentListEmpty)".to_string(), |tail, name| {
                    format!("(ImportIdentList \"{name}\" {tail})")
                });
            format!("(ImportDeclList \"{module}\" {idents} {tail})")
        });
    let objects = objects
        .iter()
        .rev()
        .fold("(OEmpty)".to_string(), |tail, object| {
            format!("(ObjectDeclList {object} {tail})")
        });
    format!("(Program {imports} {objects})")
}

/// Load a module set through the real loader.
pub fn link(modules: &[(&str, &str)], entry: &str) -> TypeTable {
    let parser = modules
        .iter()
        .fold(StaticParser::new(), |parser, (name, text)| {
            parser.with_module(*name, *text)
        });
    Loader::new(parser, "/programs").load(entry).unwrap()
}

/// Topology with a single environment on an ephemeral control port.
pub fn local_topology(env: &str) -> Topology {
    Topology::default().with_environment(
        env,
        EnvironmentSpec {
            ip: "127.0.0.1".to_string(),
            port: 0,
            connections: vec![],
        },
    )
}

/// Start an environment whose io is captured.
pub async fn start_captured(env: &str) -> (Environment, MailboxReceiver<String>) {
    let (io, lines) = IoSink::capture();
    let environment = Environment::start_with_io(env, local_topology(env), io)
        .await
        .unwrap();
    (environment, lines)
}

/// Next captured io line, bounded so a hung program fails the test.
pub async fn next_line(lines: &mut MailboxReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(10), lines.recv())
        .await
        .expect("program produced no output in time")
        .expect("io sink closed")
}

//! Single-environment programs driven end to end: load, link, spawn Main,
//! inject `run`, observe io.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{active, link, method, next_line, passive, program, start_captured};

/// A passive counter mutated through synchronous calls.
#[tokio::test]
async fn test_local_passive_chain_prints_three() {
    let counter = passive(
        "Counter",
        &[("TypeInt", "count")],
        &[
            method(
                "TypeVoid",
                "inc",
                &[],
                &[r#"(SEqualField (ExpThis) "count" (ExpOp (ExpFieldAccess (ExpThis) "count") "+" (ExpInt 1)))"#.to_string()],
            ),
            method(
                "TypeInt",
                "get",
                &[],
                &[r#"(SReturn (ExpFieldAccess (ExpThis) "count"))"#.to_string()],
            ),
        ],
    );
    let main = active(
        "Main",
        &[],
        &[method(
            "TypeVoid",
            "run",
            &[],
            &[
                r#"(SVarDeclEqual (TypeIdent "Counter") "c" (ExpNewPassive "Counter" (ExpList (ExpInt 0) (ExpListEmpty))))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIdent "c") "inc" (ExpListEmpty)))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIdent "c") "inc" (ExpListEmpty)))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIdent "c") "inc" (ExpListEmpty)))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIO) "print" (ExpList (ExpFCall (ExpIdent "c") "get" (ExpListEmpty)) (ExpListEmpty))))"#.to_string(),
            ],
        )],
    );
    let types = link(&[("main", &program(&[], &[main, counter]))], "main");

    let (environment, mut lines) = start_captured("alpha").await;
    environment.run_program(types, "main").await.unwrap();

    assert_eq!(next_line(&mut lines).await, "3");
}

/// Request/reply against a locally spawned actor.
#[tokio::test]
async fn test_local_actor_request_reply_prints_five() {
    let worker = active(
        "Worker",
        &[],
        &[method(
            "TypeInt",
            "add",
            &[("TypeInt", "a"), ("TypeInt", "b")],
            &[r#"(SReturn (ExpOp (ExpIdent "a") "+" (ExpIdent "b")))"#.to_string()],
        )],
    );
    let main = active(
        "Main",
        &[],
        &[method(
            "TypeVoid",
            "run",
            &[],
            &[
                r#"(SEqual "w" (ExpSpawnActive "Worker" (ExpListEmpty)))"#.to_string(),
                r#"(SWaitMessage "x" (ExpIdent "w") "add" (ExpList (ExpInt 2) (ExpList (ExpInt 3) (ExpListEmpty))))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIO) "print" (ExpList (ExpIdent "x") (ExpListEmpty))))"#.to_string(),
            ],
        )],
    );
    let types = link(&[("main", &program(&[], &[main, worker]))], "main");

    let (environment, mut lines) = start_captured("alpha").await;
    environment.run_program(types, "main").await.unwrap();

    assert_eq!(next_line(&mut lines).await, "5");
}

/// Fan out to eight workers and await each reply; results land in sent
/// order.
#[tokio::test]
async fn test_fan_out_collects_replies_in_sent_order() {
    let worker = active(
        "Worker",
        &[],
        &[method(
            "TypeInt",
            "compute",
            &[("TypeInt", "n")],
            &[r#"(SReturn (ExpOp (ExpOp (ExpIdent "n") "*" (ExpInt 2)) "+" (ExpInt 1)))"#.to_string()],
        )],
    );
    let loop_body = common::stmt_list(&[
        r#"(SEqual "w" (ExpSpawnActive "Worker" (ExpListEmpty)))"#.to_string(),
        r#"(SWaitMessage "x" (ExpIdent "w") "compute" (ExpList (ExpIdent "i") (ExpListEmpty)))"#.to_string(),
        r#"(SArrayEqual "results" (ExpIdent "i") (ExpIdent "x"))"#.to_string(),
        r#"(SEqual "i" (ExpOp (ExpIdent "i") "+" (ExpInt 1)))"#.to_string(),
    ]);
    let zeros = common::exp_list(&vec!["(ExpInt 0)".to_string(); 8]);
    let main = active(
        "Main",
        &[],
        &[method(
            "TypeVoid",
            "run",
            &[],
            &[
                format!(r#"(SEqual "results" (ExpArrayValue {zeros}))"#),
                r#"(SEqual "i" (ExpInt 0))"#.to_string(),
                format!(
                    r#"(SWhile (ExpComOp (ExpIdent "i") "<" (ExpInt 8)) (SList {loop_body}))"#
                ),
                r#"(SExp (ExpFCall (ExpIO) "print" (ExpList (ExpIdent "results") (ExpListEmpty))))"#.to_string(),
            ],
        )],
    );
    let types = link(&[("main", &program(&[], &[main, worker]))], "main");

    let (environment, mut lines) = start_captured("alpha").await;
    environment.run_program(types, "main").await.unwrap();

    assert_eq!(
        next_line(&mut lines).await,
        "[1, 3, 5, 7, 9, 11, 13, 15]"
    );
}

/// A runtime error terminates the failing actor only; the bus and every
/// other actor keep running.
#[tokio::test]
async fn test_actor_failure_does_not_stop_the_environment() {
    let bad = active(
        "Bad",
        &[],
        &[method(
            "TypeVoid",
            "boom",
            &[],
            // int + string is an operator kind mismatch at run time.
            &[r#"(SReturn (ExpOp (ExpInt 1) "+" (ExpString "x")))"#.to_string()],
        )],
    );
    let worker = active(
        "Worker",
        &[],
        &[method(
            "TypeInt",
            "add",
            &[("TypeInt", "a"), ("TypeInt", "b")],
            &[r#"(SReturn (ExpOp (ExpIdent "a") "+" (ExpIdent "b")))"#.to_string()],
        )],
    );
    let main = active(
        "Main",
        &[],
        &[method(
            "TypeVoid",
            "run",
            &[],
            &[
                r#"(SEqual "b" (ExpSpawnActive "Bad" (ExpListEmpty)))"#.to_string(),
                r#"(SSendMessage (ExpIdent "b") "boom" (ExpListEmpty))"#.to_string(),
                r#"(SEqual "w" (ExpSpawnActive "Worker" (ExpListEmpty)))"#.to_string(),
                r#"(SWaitMessage "x" (ExpIdent "w") "add" (ExpList (ExpInt 20) (ExpList (ExpInt 22) (ExpListEmpty))))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIO) "print" (ExpList (ExpIdent "x") (ExpListEmpty))))"#.to_string(),
            ],
        )],
    );
    let types = link(&[("main", &program(&[], &[main, worker, bad]))], "main");

    let (environment, mut lines) = start_captured("alpha").await;
    environment.run_program(types, "main").await.unwrap();

    assert_eq!(next_line(&mut lines).await, "42");
}

/// Module scoping: a typename imported from one module resolves there even
/// when another module declares the same name.
#[tokio::test]
async fn test_imported_type_constructs_in_its_home_module() {
    let node_m1 = passive(
        "Node",
        &[],
        &[method(
            "TypeString",
            "origin",
            &[],
            &[r#"(SReturn (ExpString "m1"))"#.to_string()],
        )],
    );
    let node_m2 = passive(
        "Node",
        &[],
        &[method(
            "TypeString",
            "origin",
            &[],
            &[r#"(SReturn (ExpString "m2"))"#.to_string()],
        )],
    );
    let other_m2 = passive("Other", &[], &[]);
    let main = active(
        "Main",
        &[],
        &[method(
            "TypeVoid",
            "run",
            &[],
            &[
                r#"(SEqual "n" (ExpNewPassive "Node" (ExpListEmpty)))"#.to_string(),
                r#"(SExp (ExpFCall (ExpIO) "print" (ExpList (ExpFCall (ExpIdent "n") "origin" (ExpListEmpty)) (ExpListEmpty))))"#.to_string(),
            ],
        )],
    );
    // Both modules load and both declare `Node`; the import binds the one
    // from m1.
    let types = link(
        &[
            ("m1", &program(&[], &[node_m1])),
            ("m2", &program(&[], &[node_m2, other_m2])),
            (
                "main",
                &program(&[("m1", &["Node"]), ("m2", &["Other"])], &[main]),
            ),
        ],
        "main",
    );
    assert!(types.resolve("m2", "Node").is_ok());

    let (environment, mut lines) = start_captured("alpha").await;
    environment.run_program(types, "main").await.unwrap();

    assert_eq!(next_line(&mut lines).await, "m1");
}

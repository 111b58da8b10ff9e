//! Two environments bridged over TCP: proxies cross the wire, requests are
//! answered across it, and replies find their way home.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};

use common::{active, link, method, program};
use frisbee_lang::{Declaration, Proxy, Value};
use frisbee_rt::message::frame;
use frisbee_rt::{
    ActorConnector, CorrelationId, Environment, EnvironmentSpec, IoSink, Topology,
};

/// Start `beta` on an ephemeral port, then `alpha` configured to connect to
/// it at startup.
async fn bridged_pair() -> (Environment, Environment) {
    let beta_topology = Topology::default().with_environment(
        "beta",
        EnvironmentSpec {
            ip: "127.0.0.1".to_string(),
            port: 0,
            connections: vec![],
        },
    );
    let beta = Environment::start_with_io("beta", beta_topology, IoSink::stdout())
        .await
        .unwrap();

    let alpha_topology = Topology::default()
        .with_environment(
            "alpha",
            EnvironmentSpec {
                ip: "127.0.0.1".to_string(),
                port: 0,
                connections: vec!["beta".to_string()],
            },
        )
        .with_environment(
            "beta",
            EnvironmentSpec {
                ip: "127.0.0.1".to_string(),
                port: beta.local_addr().port(),
                connections: vec![],
            },
        );
    let alpha = Environment::start_with_io("alpha", alpha_topology, IoSink::stdout())
        .await
        .unwrap();

    (alpha, beta)
}

fn declaration(types: &frisbee_lang::TypeTable, module: &str, name: &str) -> Arc<frisbee_lang::ObjectDecl> {
    match types.resolve(module, name).unwrap() {
        Declaration::Object(decl) => Arc::clone(decl),
        Declaration::Builtin { .. } => panic!("expected a source declaration"),
    }
}

/// A request from alpha is handled on beta; beta messages back the proxy it
/// was handed, and the reply value arrives at the alpha caller.
#[tokio::test]
async fn test_cross_environment_request_reply_with_proxy_argument() {
    let (alpha, beta) = bridged_pair().await;

    // Hosted on beta: answers with 42 after poking the proxy it was given.
    let responder = active(
        "Responder",
        &[],
        &[method(
            "TypeInt",
            "answer",
            &[("TypeAnonymous", "target")],
            &[
                r#"(SSendMessage (ExpIdent "target") "inc" (ExpListEmpty))"#.to_string(),
                r#"(SReturn (ExpInt 42))"#.to_string(),
            ],
        )],
    );
    let beta_types = link(&[("remote", &program(&[], &[responder]))], "remote");
    let beta_runtime = beta.runtime(beta_types.clone());
    let responder_proxy = beta_runtime
        .spawn_active(declaration(&beta_types, "remote", "Responder"), vec![])
        .unwrap();

    // Hosted on alpha: counts the pokes.
    let tally = active(
        "Tally",
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
    let alpha_types = link(&[("local", &program(&[], &[tally]))], "local");
    let alpha_runtime = alpha.runtime(alpha_types.clone());
    let tally_proxy = alpha_runtime
        .spawn_active(
            declaration(&alpha_types, "local", "Tally"),
            vec![Value::Int(0)],
        )
        .unwrap();

    // Drive from a probe connector on alpha's bus, like a caller's wait
    // statement would.
    let mut probe = ActorConnector::attach(alpha.bus()).unwrap();
    let correlation = CorrelationId::new();
    probe
        .send_message(
            &responder_proxy,
            "answer",
            vec![Value::Proxy(tally_proxy.clone())],
            Some(correlation),
        )
        .unwrap();

    let value = tokio::time::timeout(
        Duration::from_secs(10),
        probe.receive_return_value(correlation),
    )
    .await
    .expect("no reply from beta")
    .unwrap();
    assert!(value.equals(&Value::Int(42)).unwrap());

    // The fire-and-forget sent from beta lands on alpha's Tally; poll until
    // it has been handled.
    let mut observed = 0;
    for _ in 0..50 {
        let correlation = CorrelationId::new();
        probe
            .send_message(&tally_proxy, "get", vec![], Some(correlation))
            .unwrap();
        let count = tokio::time::timeout(
            Duration::from_secs(10),
            probe.receive_return_value(correlation),
        )
        .await
        .expect("tally did not reply")
        .unwrap();
        observed = count.as_int().unwrap();
        if observed == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(observed, 1);
}

/// Messages sent to a proxy whose home is a peer environment arrive there
/// in sent order.
#[tokio::test]
async fn test_forwarded_messages_preserve_sender_order() {
    let (alpha, beta) = bridged_pair().await;

    let mut sink = ActorConnector::attach(beta.bus()).unwrap();
    let sender = ActorConnector::attach(alpha.bus()).unwrap();
    let dest = Proxy {
        actor_id: sink.actor_id(),
        home_env: "beta".to_string(),
    };
    for i in 0..20i64 {
        sender
            .send_message(&dest, "tick", vec![Value::Int(i)], None)
            .unwrap();
    }

    for i in 0..20i64 {
        let incoming = tokio::time::timeout(Duration::from_secs(10), sink.receive_message())
            .await
            .expect("forwarded message missing")
            .unwrap();
        assert_eq!(incoming.name, "tick");
        assert!(incoming.args[0].equals(&Value::Int(i)).unwrap());
    }
}

/// The program handshake: `init` answers `<env>:<write>:<read>` and then a
/// snapshot of the peer-main table.
#[tokio::test]
async fn test_init_handshake_reports_name_and_ports() {
    let (alpha, _beta) = bridged_pair().await;

    let stream = tokio::net::TcpStream::connect(alpha.local_addr())
        .await
        .unwrap();
    let mut framed = frame::framed(stream);
    framed.send(Bytes::from_static(b"init")).await.unwrap();

    let reply = framed.next().await.unwrap().unwrap();
    let port = alpha.local_addr().port();
    assert_eq!(
        std::str::from_utf8(&reply).unwrap(),
        format!("alpha:{port}:{port}")
    );

    let snapshot = framed.next().await.unwrap().unwrap();
    let mains: std::collections::HashMap<String, String> =
        serde_json::from_slice(&snapshot).unwrap();
    // Beta has not announced a main actor, so the table is empty.
    assert!(mains.is_empty());
}

//! Peer links and the control listener.
//!
//! Links between environments are long-lived TCP streams carrying
//! length-delimited frames (see [`crate::message::frame`]). Establishment
//! is a one-frame negotiation: the dialer sends `remote:<its_name>`, the
//! listener answers `<own_name>:<main_actor_id|none>` and the stream
//! becomes a duplex envelope channel. The same listener also serves the
//! program handshake: a client sending `init` learns the environment name,
//! its ports and a snapshot of the peer-main table.
//!
//! Each link gets a dedicated reader task feeding the switch's fan-in
//! queue, and a writer task draining a per-link queue - so peer sockets are
//! only ever written from one place.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::error::BusError;
use super::switch::{BusEvent, BusShared};
use crate::mailbox::{mailbox, MailboxSender};
use crate::message::frame;
use crate::system::Topology;
use frisbee_lang::ActorId;

/// The program handshake command.
pub(crate) const INIT: &[u8] = b"init";

/// Prefix of the peer handshake command.
pub(crate) const REMOTE_PREFIX: &str = "remote:";

/// Reply token for "no main actor announced yet".
const NO_MAIN: &str = "none";

/// The sending half of an established peer link.
///
/// Frames queue here and a dedicated writer task drains them onto the
/// socket.
#[derive(Debug, Clone)]
pub struct PeerLink {
    frames: MailboxSender<Bytes>,
}

impl PeerLink {
    /// Queue one frame; fails when the link's writer task has stopped.
    pub fn send(&self, frame: Bytes) -> Result<(), BusError> {
        self.frames.send(frame).map_err(|_| BusError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.frames.is_closed()
    }
}

/// Dial a configured peer and negotiate the link.
///
/// Returns the link plus the peer's announced main actor, if it has one.
pub(crate) async fn dial(
    peer_env: &str,
    topology: &Topology,
    self_env: &str,
    ingress: mpsc::UnboundedSender<BusEvent>,
) -> Result<(PeerLink, Option<ActorId>), BusError> {
    let spec = topology
        .environment(peer_env)
        .map_err(|_| BusError::UnknownPeer(peer_env.to_string()))?;
    let addr = format!("{}:{}", spec.ip, spec.port);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| BusError::PeerUnreachable {
            env: peer_env.to_string(),
            reason: e.to_string(),
        })?;
    let mut framed = frame::framed(stream);

    framed
        .send(Bytes::from(format!("{REMOTE_PREFIX}{self_env}")))
        .await
        .map_err(|e| BusError::Handshake(e.to_string()))?;
    let reply = framed
        .next()
        .await
        .ok_or_else(|| BusError::Handshake("peer closed during handshake".to_string()))?
        .map_err(|e| BusError::Handshake(e.to_string()))?;
    let (announced, main) = parse_handshake_reply(&reply)?;
    if announced != peer_env {
        warn!(expected = peer_env, announced = %announced, "peer announced an unexpected name");
    }

    debug!(peer = peer_env, %addr, "peer link established");
    Ok((attach(framed, peer_env, ingress), main))
}

/// Turn a negotiated stream into a running link: spawn its reader and
/// writer tasks and hand back the queueing half.
pub(crate) fn attach(
    framed: tokio_util::codec::Framed<TcpStream, tokio_util::codec::LengthDelimitedCodec>,
    peer_env: &str,
    ingress: mpsc::UnboundedSender<BusEvent>,
) -> PeerLink {
    let (sink, stream) = framed.split();
    let link = spawn_writer(sink, peer_env);
    spawn_reader(stream, peer_env, ingress);
    link
}

type FramedSink =
    futures::stream::SplitSink<tokio_util::codec::Framed<TcpStream, tokio_util::codec::LengthDelimitedCodec>, Bytes>;
type FramedStream =
    futures::stream::SplitStream<tokio_util::codec::Framed<TcpStream, tokio_util::codec::LengthDelimitedCodec>>;

/// Writer task: the only place a peer socket is written.
fn spawn_writer(mut sink: FramedSink, peer_env: &str) -> PeerLink {
    let (tx, mut rx) = mailbox::<Bytes>();
    let peer = peer_env.to_string();
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sink.send(frame).await {
                warn!(peer = %peer, error = %e, "peer link write failed");
                break;
            }
        }
        debug!(peer = %peer, "peer link writer stopped");
    });
    PeerLink { frames: tx }
}

/// Reader task: every decoded frame joins the switch's fan-in queue.
fn spawn_reader(mut stream: FramedStream, peer_env: &str, ingress: mpsc::UnboundedSender<BusEvent>) {
    let peer = peer_env.to_string();
    tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            let bytes = match result {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(peer = %peer, error = %e, "peer link read failed");
                    break;
                }
            };
            match frame::decode(&bytes) {
                Ok((topic, payload)) => {
                    if ingress
                        .send(BusEvent::Publication { topic, payload })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => warn!(peer = %peer, error = %e, "dropping malformed frame"),
            }
        }
        debug!(peer = %peer, "peer link closed");
    });
}

/// `<env>:<main|none>` from the listener side of the negotiation.
fn parse_handshake_reply(reply: &[u8]) -> Result<(String, Option<ActorId>), BusError> {
    let text = std::str::from_utf8(reply)
        .map_err(|_| BusError::Handshake("reply is not utf-8".to_string()))?;
    let (env, main) = text
        .split_once(':')
        .ok_or_else(|| BusError::Handshake(format!("malformed reply `{text}`")))?;
    let main = match main {
        NO_MAIN => None,
        id => Some(
            id.parse()
                .map_err(|_| BusError::Handshake(format!("bad main actor id `{id}`")))?,
        ),
    };
    Ok((env.to_string(), main))
}

/// Everything the control listener needs to serve handshakes.
#[derive(Debug, Clone)]
pub struct ListenerCtx {
    pub(crate) env_name: String,
    pub(crate) control_port: u16,
    pub(crate) shared: Arc<BusShared>,
    pub(crate) ingress: mpsc::UnboundedSender<BusEvent>,
}

impl ListenerCtx {
    pub(crate) fn new(
        env_name: &str,
        control_port: u16,
        shared: Arc<BusShared>,
        ingress: mpsc::UnboundedSender<BusEvent>,
    ) -> Self {
        Self {
            env_name: env_name.to_string(),
            control_port,
            shared,
            ingress,
        }
    }
}

/// Accept loop of the control listener.
pub(crate) async fn accept_loop(listener: TcpListener, ctx: ListenerCtx) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(%addr, "control connection accepted");
                tokio::spawn(serve_connection(stream, ctx.clone()));
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    }
}

async fn serve_connection(stream: TcpStream, ctx: ListenerCtx) {
    let mut framed = frame::framed(stream);
    let Some(Ok(first)) = framed.next().await else {
        return;
    };

    if &first[..] == INIT {
        serve_init(framed, &ctx).await;
        return;
    }
    match std::str::from_utf8(&first).ok().and_then(|t| t.strip_prefix(REMOTE_PREFIX)) {
        Some(peer) => serve_remote(framed, peer.to_string(), ctx).await,
        None => warn!("unknown control command; closing connection"),
    }
}

/// `init`: tell a program client who we are and what we know of the peers.
///
/// The in-process transport is channel-based, so the two advertised ports
/// both collapse to the control port; the reply shape is kept for client
/// compatibility.
async fn serve_init(
    mut framed: tokio_util::codec::Framed<TcpStream, tokio_util::codec::LengthDelimitedCodec>,
    ctx: &ListenerCtx,
) {
    let ports = format!("{}:{}:{}", ctx.env_name, ctx.control_port, ctx.control_port);
    if let Err(e) = framed.send(Bytes::from(ports)).await {
        warn!(error = %e, "init reply failed");
        return;
    }

    let snapshot: HashMap<String, String> = ctx
        .shared
        .other_mains()
        .into_iter()
        .map(|(env, main)| (env, main.to_string()))
        .collect();
    match serde_json::to_vec(&snapshot) {
        Ok(encoded) => {
            if let Err(e) = framed.send(Bytes::from(encoded)).await {
                warn!(error = %e, "peer-main snapshot send failed");
            }
        }
        Err(e) => warn!(error = %e, "cannot encode peer-main snapshot"),
    }
}

/// `remote:<peer>`: answer the negotiation and attach the stream as a
/// duplex envelope link.
async fn serve_remote(
    mut framed: tokio_util::codec::Framed<TcpStream, tokio_util::codec::LengthDelimitedCodec>,
    peer: String,
    ctx: ListenerCtx,
) {
    let reply = match ctx.shared.main_actor() {
        Some(main) => format!("{}:{main}", ctx.env_name),
        None => format!("{}:{NO_MAIN}", ctx.env_name),
    };
    if let Err(e) = framed.send(Bytes::from(reply)).await {
        warn!(peer = %peer, error = %e, "handshake reply failed");
        return;
    }

    // Announce the link before the reader runs: anything the peer sends
    // must find the link already routable (its reply travels back on it).
    let (sink, stream) = framed.split();
    let link = spawn_writer(sink, &peer);
    if ctx
        .ingress
        .send(BusEvent::PeerAttached {
            env: peer.clone(),
            main: None,
            link,
        })
        .is_err()
    {
        warn!(peer = %peer, "bus stopped before peer could attach");
        return;
    }
    spawn_reader(stream, &peer, ctx.ingress.clone());
}

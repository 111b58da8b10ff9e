//! The `sockets` builtin module.
//!
//! `TCPServer(port)` listens on localhost and answers `accept()` with a
//! proxy to a freshly hosted `TCPConnection` actor; the connection object
//! answers `get()` with one received chunk (void at end-of-stream) and
//! `send(s)` with a newline-terminated write. Both are ordinary actors:
//! they live on their own tasks and are reachable only by message.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

// Layer 3: Internal module imports
use crate::actor::object::{ActiveObject, ActorCtx};
use crate::connector::ActorConnector;
use frisbee_lang::{RuntimeError, Value};

/// Read buffer for one `get()`.
const READ_CHUNK: usize = 1024;

/// `sockets.TCPServer` - a listening socket as an active object.
pub struct TcpServerObject {
    port: u16,
    listener: Option<TcpListener>,
}

impl TcpServerObject {
    /// Constructor arguments: exactly one integer port.
    pub fn new(args: Vec<Value>) -> Result<Self, RuntimeError> {
        let [port] = args.as_slice() else {
            return Err(RuntimeError::TypeError(
                "TCPServer takes exactly one argument, the port".to_string(),
            ));
        };
        let port = u16::try_from(port.as_int()?)
            .map_err(|_| RuntimeError::TypeError("TCPServer port out of range".to_string()))?;
        Ok(Self {
            port,
            listener: None,
        })
    }
}

#[async_trait]
impl ActiveObject for TcpServerObject {
    fn label(&self) -> String {
        "sockets.TCPServer".to_string()
    }

    async fn on_start(&mut self, _ctx: &mut ActorCtx<'_>) -> Result<(), RuntimeError> {
        let listener = TcpListener::bind(("127.0.0.1", self.port))
            .await
            .map_err(|e| RuntimeError::Transport(format!("cannot bind port {}: {e}", self.port)))?;
        debug!(port = self.port, "TCPServer listening");
        self.listener = Some(listener);
        Ok(())
    }

    async fn proceed_message(
        &mut self,
        name: &str,
        _args: Vec<Value>,
        ctx: &mut ActorCtx<'_>,
    ) -> Result<Value, RuntimeError> {
        match name {
            "accept" => {
                let listener = self.listener.as_ref().ok_or_else(|| {
                    RuntimeError::Transport("TCPServer not listening".to_string())
                })?;
                let (stream, addr) = listener
                    .accept()
                    .await
                    .map_err(|e| RuntimeError::Transport(format!("accept failed: {e}")))?;
                debug!(%addr, "connection accepted");

                let connector = ActorConnector::attach(ctx.runtime.bus())
                    .map_err(|e| RuntimeError::Transport(e.to_string()))?;
                let proxy = ctx
                    .runtime
                    .spawn_object(Box::new(TcpConnectionObject::new(stream)), connector);
                Ok(Value::Proxy(proxy))
            }
            other => Err(RuntimeError::NoMethod {
                object: self.label(),
                method: other.to_string(),
            }),
        }
    }
}

/// `sockets.TCPConnection` - one accepted stream as an active object.
pub struct TcpConnectionObject {
    stream: TcpStream,
}

impl TcpConnectionObject {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl ActiveObject for TcpConnectionObject {
    fn label(&self) -> String {
        "sockets.TCPConnection".to_string()
    }

    async fn proceed_message(
        &mut self,
        name: &str,
        args: Vec<Value>,
        _ctx: &mut ActorCtx<'_>,
    ) -> Result<Value, RuntimeError> {
        match name {
            "get" => {
                let mut buffer = vec![0u8; READ_CHUNK];
                let read = self
                    .stream
                    .read(&mut buffer)
                    .await
                    .map_err(|e| RuntimeError::Transport(format!("read failed: {e}")))?;
                if read == 0 {
                    return Ok(Value::Void);
                }
                let text = String::from_utf8_lossy(&buffer[..read]);
                Ok(Value::Str(text.trim().to_string()))
            }
            "send" => {
                let line = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.stream
                    .write_all(format!("{line}\n").as_bytes())
                    .await
                    .map_err(|e| RuntimeError::Transport(format!("write failed: {e}")))?;
                Ok(Value::Void)
            }
            other => Err(RuntimeError::NoMethod {
                object: self.label(),
                method: other.to_string(),
            }),
        }
    }
}

//! Peer frame format.
//!
//! Each frame on a peer link is one routed publication:
//! `<topic>#<>#<payload>`, carried inside a length-delimited frame so the
//! stream can never tear an envelope apart. The same separator also frames
//! the handshake lines exchanged when a link is established.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::{BufMut, Bytes, BytesMut};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

// Layer 3: Internal module imports
use super::topic::{Topic, TopicError};

/// Separator between topic and payload inside one frame.
pub const SEPARATOR: &[u8] = b"#<>#";

/// Wrap a peer stream in the length-delimited codec used on every link.
pub fn framed(stream: TcpStream) -> Framed<TcpStream, LengthDelimitedCodec> {
    Framed::new(stream, LengthDelimitedCodec::new())
}

/// Encode one publication into a frame body.
pub fn encode(topic: &Topic, payload: &[u8]) -> Bytes {
    let topic = topic.to_string();
    let mut frame = BytesMut::with_capacity(topic.len() + SEPARATOR.len() + payload.len());
    frame.put_slice(topic.as_bytes());
    frame.put_slice(SEPARATOR);
    frame.put_slice(payload);
    frame.freeze()
}

/// Frame decode failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame carries no `#<>#` separator")]
    MissingSeparator,

    #[error("frame topic is not utf-8")]
    BadTopicEncoding,

    #[error(transparent)]
    Topic(#[from] TopicError),
}

/// Split a frame body back into its topic and payload.
pub fn decode(frame: &[u8]) -> Result<(Topic, Bytes), FrameError> {
    let at = frame
        .windows(SEPARATOR.len())
        .position(|window| window == SEPARATOR)
        .ok_or(FrameError::MissingSeparator)?;
    let topic = std::str::from_utf8(&frame[..at]).map_err(|_| FrameError::BadTopicEncoding)?;
    let topic: Topic = topic.parse()?;
    let payload = Bytes::copy_from_slice(&frame[at + SEPARATOR.len()..]);
    Ok((topic, payload))
}

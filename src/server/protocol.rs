//! Protocol messages for client-daemon communication
//!
//! Uses a simple length-prefixed JSON protocol:
//! - 4 bytes (big-endian u32): payload length
//! - N bytes: UTF-8 JSON payload
//!
//! JSON is not self-delimiting on a stream socket, so the prefix is the only
//! thing that says where a message ends.

use crate::entry::SearchResult;
use crate::search::Operation;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Frames larger than this are rejected without allocating
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// Everything that travels over the daemon socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetworkMessage {
    /// Client to daemon: run one operation
    SearchRequest {
        operation: Operation,
        pattern: String,
        #[serde(default, rename = "includeSource")]
        include_source: bool,
    },

    /// Daemon to client: entries per searched file
    SearchResponse { entries: SearchResult },

    /// Daemon to client: the request could not be served
    Error { message: String },
}

impl NetworkMessage {
    /// Wire name of the message type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            NetworkMessage::SearchRequest { .. } => "SearchRequest",
            NetworkMessage::SearchResponse { .. } => "SearchResponse",
            NetworkMessage::Error { .. } => "Error",
        }
    }
}

/// Write a message to a stream with length prefix
pub fn write_message<W: Write>(writer: &mut W, msg: &impl Serialize) -> std::io::Result<()> {
    let json = serde_json::to_vec(msg).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    if json.len() > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Message too large",
        ));
    }

    let len = json.len() as u32;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(())
}

/// Read a message from a stream with length prefix.
///
/// Blocks until the whole frame has arrived, however the bytes are split
/// across reads.
pub fn read_message<R: Read, T: for<'de> Deserialize<'de>>(reader: &mut R) -> std::io::Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Message too large",
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    serde_json::from_slice(&buf).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })
}

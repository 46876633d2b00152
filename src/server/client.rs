//! Client for querying a running search daemon

use crate::entry::SearchResult;
use crate::error::{Error, Result};
use crate::search::Operation;
use crate::server::protocol::{read_message, write_message, NetworkMessage};
use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tracing::debug;

/// Read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the daemon at one address.
///
/// Each query opens its own connection, sends one request, waits for the
/// response and disconnects.
#[derive(Debug, Clone, Copy)]
pub struct DaemonClient {
    addr: SocketAddr,
}

impl DaemonClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run one operation on the daemon
    pub fn search(&self, operation: Operation, pattern: &str, include_source: bool) -> Result<SearchResult> {
        let stream = TcpStream::connect(self.addr).map_err(|source| Error::FailedToConnectToDaemon {
            addr: self.addr,
            source,
        })?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        let request = NetworkMessage::SearchRequest {
            operation,
            pattern: pattern.to_string(),
            include_source,
        };
        write_message(&mut writer, &request)?;
        debug!(addr = %self.addr, %operation, pattern, "request sent");

        let response: NetworkMessage = read_message(&mut reader)?;

        match response {
            NetworkMessage::SearchResponse { entries } => Ok(entries),
            NetworkMessage::Error { message } => Err(Error::Daemon(message)),
            other => Err(Error::Protocol(format!(
                "Invalid response from daemon: {}",
                other.type_name()
            ))),
        }
    }
}

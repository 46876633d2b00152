//! TCP search daemon.
//!
//! Binds the port first, then indexes the tree, then serves one connection
//! at a time: read one request, answer it, close. Requests are handled in
//! arrival order on a single thread.

use crate::error::Result;
use crate::search::CodeSearch;
use crate::server::protocol::{read_message, write_message, NetworkMessage};
use std::io::{BufReader, BufWriter, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Well-known port shared by the daemon and client
pub const DAEMON_PORT: u16 = 32458;

/// Per-connection read/write timeout
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Loopback address the daemon listens on for `port`
pub fn daemon_addr(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

/// A bound listener plus an indexed search session
pub struct SearchDaemon {
    listener: TcpListener,
    search: CodeSearch,
    served: u64,
}

impl SearchDaemon {
    /// Bind `addr`, then index `root`.
    ///
    /// Binding first makes a port conflict fail before any indexing work.
    /// Connections that arrive while indexing wait in the listen backlog.
    pub fn start(root: &Path, addr: SocketAddr, show_progress: bool) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!(addr = %listener.local_addr()?, "bound");

        let search = CodeSearch::open(root, false)?.with_index(show_progress);
        Ok(Self::from_parts(listener, search))
    }

    /// Serve an already-opened session on an already-bound listener
    pub fn from_parts(listener: TcpListener, search: CodeSearch) -> Self {
        Self {
            listener,
            search,
            served: 0,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn session(&self) -> &CodeSearch {
        &self.search
    }

    /// Serve connections until the process is killed
    pub fn run(&mut self) -> Result<()> {
        info!(
            root = %self.search.root().display(),
            files = self.search.files().len(),
            "listening on {}",
            self.local_addr()?
        );

        loop {
            self.serve_next();
        }
    }

    /// Accept and fully handle one connection.
    ///
    /// Failures are confined to that connection: they are logged and the
    /// daemon stays up.
    pub fn serve_next(&mut self) {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                let start = Instant::now();
                if let Err(e) = self.handle_connection(stream) {
                    warn!(%peer, error = %e, "connection error");
                }
                self.served += 1;
                debug!(%peer, served = self.served, elapsed = ?start.elapsed(), "connection closed");
            }
            Err(e) => {
                warn!(error = %e, "accept error");
                thread::sleep(ACCEPT_BACKOFF);
            }
        }
    }

    /// Handle a single client connection
    fn handle_connection(&self, stream: TcpStream) -> Result<()> {
        stream.set_read_timeout(Some(CONNECTION_TIMEOUT))?;
        stream.set_write_timeout(Some(CONNECTION_TIMEOUT))?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        let response = match read_message(&mut reader) {
            Ok(request) => self.handle_request(request),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // Client disconnected
                return Ok(());
            }
            Err(e) => NetworkMessage::Error {
                message: format!("Invalid request: {}", e),
            },
        };

        send_response(&mut writer, &response)
    }

    /// Handle a single request
    fn handle_request(&self, request: NetworkMessage) -> NetworkMessage {
        match request {
            NetworkMessage::SearchRequest {
                operation,
                pattern,
                include_source,
            } => {
                let include_source = include_source || self.search.config().include_source;
                info!(%operation, %pattern, include_source, "search request");

                match self.search.search_with_source(operation, &pattern, include_source) {
                    Ok(entries) => NetworkMessage::SearchResponse { entries },
                    Err(e) => NetworkMessage::Error {
                        message: e.to_string(),
                    },
                }
            }
            other => NetworkMessage::Error {
                message: format!("Unexpected message: {}", other.type_name()),
            },
        }
    }
}

/// Write `response`, or an `Error` message in its place if it cannot be
/// encoded. Encoding failures are reported before any byte is written.
fn send_response<W: Write>(writer: &mut W, response: &NetworkMessage) -> Result<()> {
    match write_message(writer, response) {
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            warn!(error = %e, "response could not be encoded");
            let fallback = NetworkMessage::Error {
                message: format!("Failed to encode response: {}", e),
            };
            write_message(writer, &fallback)?;
            Ok(())
        }
        result => Ok(result?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Operation;
    use std::fs;
    use std::path::PathBuf;

    fn daemon() -> (tempfile::TempDir, SearchDaemon) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "class Manager:\n    pass\n").unwrap();
        let daemon = SearchDaemon::start(dir.path(), daemon_addr(0), false).unwrap();
        (dir, daemon)
    }

    fn exchange(addr: SocketAddr, raw: &[u8]) -> NetworkMessage {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw).unwrap();
        let mut reader = BufReader::new(stream);
        read_message(&mut reader).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_unencodable_response_becomes_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut entries = crate::entry::SearchResult::new();
        entries.insert(PathBuf::from(OsStr::from_bytes(b"/tree/bad\xff.py")), vec![]);

        let mut buf = Vec::new();
        send_response(&mut buf, &NetworkMessage::SearchResponse { entries }).unwrap();

        let decoded: NetworkMessage = read_message(&mut buf.as_slice()).unwrap();
        match decoded {
            NetworkMessage::Error { message } => assert!(message.starts_with("Failed to encode response")),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_daemon_addr_is_loopback() {
        assert_eq!(daemon_addr(DAEMON_PORT).to_string(), "127.0.0.1:32458");
    }

    #[test]
    fn test_search_request_answered() {
        let (_dir, mut daemon) = daemon();
        let addr = daemon.local_addr().unwrap();
        let expected = daemon.session().search(Operation::Classes, "Man").unwrap();

        let handle = thread::spawn(move || daemon.serve_next());

        let mut frame = Vec::new();
        write_message(
            &mut frame,
            &NetworkMessage::SearchRequest {
                operation: Operation::Classes,
                pattern: "Man".to_string(),
                include_source: false,
            },
        )
        .unwrap();

        let response = exchange(addr, &frame);
        handle.join().unwrap();
        assert_eq!(response, NetworkMessage::SearchResponse { entries: expected });
    }

    #[test]
    fn test_invalid_pattern_answered_with_error() {
        let (_dir, mut daemon) = daemon();
        let addr = daemon.local_addr().unwrap();
        let handle = thread::spawn(move || daemon.serve_next());

        let mut frame = Vec::new();
        write_message(
            &mut frame,
            &NetworkMessage::SearchRequest {
                operation: Operation::Functions,
                pattern: "(".to_string(),
                include_source: false,
            },
        )
        .unwrap();

        let response = exchange(addr, &frame);
        handle.join().unwrap();
        assert!(matches!(response, NetworkMessage::Error { .. }));
    }

    #[test]
    fn test_garbage_request_answered_with_error() {
        let (_dir, mut daemon) = daemon();
        let addr = daemon.local_addr().unwrap();
        let handle = thread::spawn(move || daemon.serve_next());

        let body = b"not json";
        let mut frame = (body.len() as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(body);

        let response = exchange(addr, &frame);
        handle.join().unwrap();
        match response {
            NetworkMessage::Error { message } => assert!(message.starts_with("Invalid request")),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_survives_silent_client() {
        let (_dir, mut daemon) = daemon();
        let addr = daemon.local_addr().unwrap();

        let handle = thread::spawn(move || {
            daemon.serve_next();
            daemon.serve_next();
        });

        drop(TcpStream::connect(addr).unwrap());

        let mut frame = Vec::new();
        write_message(
            &mut frame,
            &NetworkMessage::SearchRequest {
                operation: Operation::Classes,
                pattern: "Manager".to_string(),
                include_source: false,
            },
        )
        .unwrap();
        let response = exchange(addr, &frame);
        handle.join().unwrap();
        assert!(matches!(response, NetworkMessage::SearchResponse { .. }));
    }

    #[test]
    fn test_response_message_rejected_as_request() {
        let (_dir, mut daemon) = daemon();
        let addr = daemon.local_addr().unwrap();
        let handle = thread::spawn(move || daemon.serve_next());

        let mut frame = Vec::new();
        write_message(
            &mut frame,
            &NetworkMessage::Error {
                message: "hi".to_string(),
            },
        )
        .unwrap();

        let response = exchange(addr, &frame);
        handle.join().unwrap();
        assert_eq!(
            response,
            NetworkMessage::Error {
                message: "Unexpected message: Error".to_string()
            }
        );
    }
}

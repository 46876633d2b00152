//! Persistent search daemon for warm queries
//!
//! The daemon parses the tree once at startup and keeps every syntax tree in
//! memory, so queries skip the parse step.
//!
//! Architecture:
//! - Daemon: binds a loopback TCP port, indexes the tree, answers requests
//!   one at a time
//! - Client: connects, sends one request, reads one response, disconnects
//! - No fallback: client mode fails when the daemon is unreachable

mod client;
pub mod daemon;
pub mod protocol;

pub use client::DaemonClient;
pub use daemon::{daemon_addr, SearchDaemon, DAEMON_PORT};
pub use protocol::NetworkMessage;

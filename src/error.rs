//! Error types shared by the library and the binary

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for codesearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Anything that can go wrong for a single file is an
/// [`crate::handlers::ExtractError`] instead and never surfaces here.
#[derive(Debug, Error)]
pub enum Error {
    /// Search root does not exist or is not a directory
    #[error("Invalid directory path specified: \"{}\"", .0.display())]
    InvalidDirectoryPath(PathBuf),

    /// Project config file is malformed
    #[error("Invalid configuration file {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    /// Search pattern is not a valid regular expression
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Client mode could not reach the daemon
    #[error("Failed to connect to {addr}. Is the daemon running?")]
    FailedToConnectToDaemon {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Daemon answered with an error message
    #[error("Daemon error: {0}")]
    Daemon(String),

    /// Peer sent something other than the expected message
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Server error types

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Startup check found the port taken
    #[error("Port {port} is already in use: {reason}")]
    PortInUse { port: u16, reason: String },

    #[error("Cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Port {0} cannot be used for an explicit bind")]
    InvalidPort(u16),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    /// The listener failed while serving
    #[error("Server I/O error: {0}")]
    Io(#[from] io::Error),
}

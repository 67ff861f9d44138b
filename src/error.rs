//! Error types for the chat server
//!
//! Defines connection-level errors and configuration errors.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors
///
/// Read failures end the session that produced them; only `LogFile`
/// is fatal to the whole process (raised while opening the room).
#[derive(Debug, Error)]
pub enum ChatError {
    /// IO error on the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the stream, or sent an interrupt signal
    #[error("end of stream")]
    EndOfStream,

    /// Channel was already closed
    #[error("channel already closed")]
    ChannelClosed,

    /// Transcript file could not be opened or created
    #[error("error opening log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChatError {
    /// Whether this error means the peer went away rather than a fault
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ChatError::EndOfStream)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

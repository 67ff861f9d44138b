//! Telnet connection handler
//!
//! Handles individual client connections: wraps the stream in a
//! `Channel` and runs the room session inside a per-connection span.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::channel::{ByteStream, Channel};
use crate::error::ChatError;
use crate::room::Room;
use crate::types::SessionId;

/// Handle a new connection
///
/// Runs the whole session to completion. End of stream is the normal
/// way for a session to end and is not reported as an error.
pub async fn handle_connection<S: ByteStream>(
    stream: S,
    peer_addr: SocketAddr,
    room: Arc<Room<S>>,
) -> Result<(), ChatError> {
    let session_id = SessionId::new();
    let span = info_span!("session", id = %session_id, peer = %peer_addr);

    async move {
        info!("Client connected");
        let channel = Arc::new(Channel::new(stream));

        match room.join(channel, peer_addr).await {
            Ok(()) => {
                info!("Client logged out");
                Ok(())
            }
            Err(ChatError::EndOfStream) => {
                info!("Client disconnected");
                Ok(())
            }
            Err(e) => {
                warn!("Session ended with error: {}", e);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

//! Connection acceptor
//!
//! Accepts TCP connections and runs each one on its own task against a
//! shared room. `run` wires configuration, room and listener together
//! and serves until Ctrl-C.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::ChatError;
use crate::handler::handle_connection;
use crate::room::Room;

/// Accept connections forever, one task per client
///
/// Accept errors are logged and the loop carries on.
pub async fn serve(listener: TcpListener, room: Arc<Room<TcpStream>>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                let room = Arc::clone(&room);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, room).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Open the room, bind the listener and serve until Ctrl-C
///
/// Fails if the transcript cannot be opened or the port cannot be bound.
pub async fn run(config: Config) -> Result<(), ChatError> {
    let room =
        Arc::new(Room::<TcpStream>::open(config.room_name.as_str(), &config.log_file_path).await?);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on port {}", config.port);

    tokio::select! {
        _ = serve(listener, room) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Goodbye!");
        }
    }

    Ok(())
}

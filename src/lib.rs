//! Multi-user Telnet Chat Server Library
//!
//! A line-oriented chat server for plain telnet clients, built on tokio.
//!
//! # Features
//! - Telnet negotiation (`DO` answered with `WILL`) and interrupt handling
//! - Display-name handshake
//! - One shared room with concurrent broadcast to every member
//! - `/help`, `/online` and `/exit` commands
//! - Append-only, timestamped transcript synced after every record
//!
//! # Architecture
//! Each connection runs `Room::join` on its own task:
//! - `Channel` turns the raw stream into lines and serialises writes
//! - `Room` holds the membership list behind a lock and fans every
//!   broadcast out to one task per member, joining them before logging
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::{TcpListener, TcpStream};
//! use telnet_chat::{serve, Room};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let room = Arc::new(Room::<TcpStream>::open("Lobby", ".").await?);
//!     let listener = TcpListener::bind("127.0.0.1:2323").await?;
//!     serve(listener, room).await;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod room;
pub mod server;
pub mod telnet;
pub mod types;
pub mod user;

// Re-export main types for convenience
pub use channel::{ByteStream, Channel};
pub use config::Config;
pub use error::{ChatError, ConfigError};
pub use handler::handle_connection;
pub use message::Command;
pub use room::Room;
pub use server::{run, serve};
pub use types::SessionId;
pub use user::User;

//! Integration tests driving the server over loopback TCP.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use telnet_chat::telnet::{DO, IAC, INTERRUPT, WILL};
use telnet_chat::{serve, Room};

/// Plain TCP client that remembers unread output
struct TelnetClient {
    stream: TcpStream,
    seen: Vec<u8>,
}

impl TelnetClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        Self {
            stream,
            seen: Vec::new(),
        }
    }

    /// Wait until `needle` shows up, consuming output up to and including it
    async fn expect(&mut self, needle: &[u8]) {
        let wait = timeout(Duration::from_secs(5), async {
            loop {
                if let Some(pos) = self.seen.windows(needle.len()).position(|w| w == needle) {
                    self.seen.drain(..pos + needle.len());
                    return;
                }
                let mut buf = [0u8; 1024];
                let n = self.stream.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed while waiting");
                self.seen.extend_from_slice(&buf[..n]);
            }
        })
        .await;
        assert!(
            wait.is_ok(),
            "timed out waiting for {:?}",
            String::from_utf8_lossy(needle)
        );
    }

    async fn send(&mut self, line: &str) {
        self.stream
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn login(&mut self, name: &str) {
        self.expect(b"What's your name: ").await;
        self.send(name).await;
        self.expect(format!("= {} joined!", name).as_bytes()).await;
        self.send("/online").await;
        self.expect(b"users online").await;
    }
}

async fn start_server() -> (std::net::SocketAddr, Arc<Room<TcpStream>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let room = Arc::new(
        Room::<TcpStream>::open("Integration Room", dir.path().to_str().unwrap())
            .await
            .unwrap(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(serve(listener, Arc::clone(&room)));

    (addr, room, dir)
}

#[tokio::test]
async fn test_two_clients_chat() {
    let (addr, room, _dir) = start_server().await;

    let mut alice = TelnetClient::connect(addr).await;
    alice.login("alice").await;
    let mut bob = TelnetClient::connect(addr).await;
    bob.login("bob").await;

    alice.expect(b"= bob joined!").await;
    bob.send("hi alice").await;
    alice.expect(b" - bob >> hi alice\r\n").await;
    bob.expect(b" - bob >> hi alice\r\n").await;

    bob.send("/online").await;
    bob.expect(b"2 users online").await;

    let log = tokio::fs::read_to_string(room.log_path()).await.unwrap();
    let records: Vec<&str> = log.split_terminator("\r\n").collect();
    assert_eq!(records.len(), 3);
    assert!(records[2].ends_with(" - bob >> hi alice"));
}

#[tokio::test]
async fn test_negotiation_is_answered() {
    let (addr, _room, _dir) = start_server().await;

    let mut client = TelnetClient::connect(addr).await;
    client.expect(b"What's your name: ").await;
    client.stream.write_all(&[IAC, DO, 0x03]).await.unwrap();
    client.expect(&[IAC, WILL, 0x03]).await;

    // The control-only payload is not taken as a name
    client.expect(b"What's your name: ").await;
    client.send("carol").await;
    client.expect(b"= carol joined!").await;
}

#[tokio::test]
async fn test_interrupt_ends_session() {
    let (addr, room, _dir) = start_server().await;

    let mut alice = TelnetClient::connect(addr).await;
    alice.login("alice").await;
    let mut bob = TelnetClient::connect(addr).await;
    bob.login("bob").await;

    bob.stream
        .write_all(&[IAC, INTERRUPT, IAC, DO, 0x06])
        .await
        .unwrap();
    alice.expect(b"= bob left!").await;

    // Server shut down its side of bob's connection
    let mut rest = Vec::new();
    timeout(Duration::from_secs(5), bob.stream.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();

    alice.send("/online").await;
    alice.expect(b"1 users online").await;
    assert_eq!(room.online_count().await, 1);
}

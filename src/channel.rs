//! Line-oriented channel over a raw byte stream
//!
//! A `Channel` turns one client connection into a sequence of text lines,
//! answering and stripping telnet control sequences on the way in and
//! framing every outbound write with a terminal "clear line" sequence.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ChatError;
use crate::telnet;

/// Line terminator used on the wire
pub const CRLF: &str = "\r\n";

/// Size of the scratch buffer used for each read
pub const READ_BUFFER_SIZE: usize = 64;

/// Erase the current line and return to column 1
pub const CLEAR_LINE: &[u8] = b"\x1b[2K\x1b[1G";

/// Move up one line, erase it and return to column 1
pub const ERASE_ECHO: &[u8] = b"\x1b[1A\x1b[2K\x1b[1G";

/// Byte streams a channel can wrap
///
/// Blanket-implemented, so `TcpStream` and `DuplexStream` both qualify.
pub trait ByteStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

struct Reader<S> {
    half: ReadHalf<S>,
    buf: [u8; READ_BUFFER_SIZE],
}

/// Line-oriented communication channel
///
/// Reads are expected from one task only (the session loop). Writes may
/// come from any task; each `write` holds the write lock for the whole
/// erase + payload pair so concurrent writers never interleave.
pub struct Channel<S> {
    reader: Mutex<Reader<S>>,
    /// `None` once the channel has been closed
    writer: Mutex<Option<WriteHalf<S>>>,
    closed: AtomicBool,
}

impl<S: ByteStream> Channel<S> {
    /// Wrap a stream, taking exclusive ownership of it
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: Mutex::new(Reader {
                half: read_half,
                buf: [0; READ_BUFFER_SIZE],
            }),
            writer: Mutex::new(Some(write_half)),
            closed: AtomicBool::new(false),
        }
    }

    /// Read the next message from the peer
    ///
    /// Keeps reading while each read fills the whole scratch buffer; a
    /// short read ends the message. A message that ends exactly on a
    /// buffer boundary is therefore joined with whatever arrives next.
    ///
    /// Returns `ChatError::EndOfStream` when the peer closes or resets the
    /// stream, or sends an interrupt command.
    pub async fn read_line(&self) -> Result<String, ChatError> {
        if self.is_closed() {
            return Err(ChatError::EndOfStream);
        }

        let mut payload = Vec::new();
        {
            let mut reader = self.reader.lock().await;
            let Reader { half, buf } = &mut *reader;
            loop {
                let n = match half.read(&mut buf[..]).await {
                    Ok(n) => n,
                    // Surface the failure on the next call
                    Err(e) if !payload.is_empty() => {
                        debug!("Read failed after {} bytes: {}", payload.len(), e);
                        break;
                    }
                    Err(e) if is_disconnect(&e) => {
                        debug!("Peer went away: {}", e);
                        return Err(ChatError::EndOfStream);
                    }
                    Err(e) => return Err(e.into()),
                };
                if n == 0 {
                    if payload.is_empty() {
                        return Err(ChatError::EndOfStream);
                    }
                    break;
                }
                payload.extend_from_slice(&buf[..n]);
                if n < buf.len() {
                    break;
                }
            }
        }

        if payload.first() == Some(&telnet::IAC) {
            debug!("Control sequence: {:?}", payload);
            let control = telnet::parse_control(&payload);
            for reply in &control.replies {
                self.write_raw(reply).await;
            }
            if control.is_interrupt() {
                return Err(ChatError::EndOfStream);
            }
            payload = control.text;
        }

        let line = payload
            .strip_suffix(CRLF.as_bytes())
            .unwrap_or(&payload[..]);
        Ok(String::from_utf8_lossy(line).into_owned())
    }

    /// Clear the client's current line, then send `data` verbatim
    ///
    /// Write errors are absorbed: the client is going away and its own
    /// session loop will notice on the next read.
    pub async fn write(&self, data: &str) {
        let mut writer = self.writer.lock().await;
        let Some(half) = writer.as_mut() else {
            return;
        };

        if write_bytes(half, CLEAR_LINE).await {
            write_bytes(half, data.as_bytes()).await;
        }
    }

    /// Erase the line the client's terminal echoed back to it
    pub async fn erase_echo(&self) {
        self.write_raw(ERASE_ECHO).await;
    }

    /// Send bytes without the clear-line prefix
    async fn write_raw(&self, bytes: &[u8]) {
        let mut writer = self.writer.lock().await;
        if let Some(half) = writer.as_mut() {
            write_bytes(half, bytes).await;
        }
    }

    /// Close the channel
    ///
    /// Shuts down the write side so the peer sees end-of-stream. Closing
    /// an already closed channel fails with `ChatError::ChannelClosed`.
    pub async fn close(&self) -> Result<(), ChatError> {
        let mut writer = self.writer.lock().await;
        let mut half = writer.take().ok_or(ChatError::ChannelClosed)?;
        self.closed.store(true, Ordering::Release);
        half.shutdown().await?;
        Ok(())
    }

    /// Check if `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Read errors that just mean the peer is gone
fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

/// Write all of `bytes`, returning false once the target has failed
async fn write_bytes<W: AsyncWrite + Unpin>(target: &mut W, bytes: &[u8]) -> bool {
    match target.write_all(bytes).await {
        Ok(()) => true,
        Err(e) => {
            debug!("Write to channel failed: {}", e);
            false
        }
    }
}

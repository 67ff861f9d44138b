//! Chat room
//!
//! A `Room` owns the list of online users and the transcript file. Each
//! connected client runs `join` on its own task; messages are fanned out
//! to every member concurrently and then appended to the transcript.

use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::channel::{ByteStream, Channel};
use crate::error::ChatError;
use crate::message::{self, Command};
use crate::user::User;

/// Extension of transcript files
const LOG_FILE_EXTENSION: &str = "dat";

/// A single chat room
///
/// Membership changes are serialised by the `online_users` lock. A
/// broadcast snapshots the list under that lock and releases it before
/// writing, so a join or leave during fan-out applies to the next one.
pub struct Room<S> {
    name: String,
    prompt: String,
    log_path: PathBuf,
    log_file: Mutex<File>,
    /// Online users in join order
    online_users: Mutex<Vec<User<S>>>,
}

impl<S: ByteStream> Room<S> {
    /// Create a room, opening (or creating) its transcript in `log_dir`
    ///
    /// The transcript is named after the room with spaces replaced by
    /// underscores. A leading `~` in `log_dir` is expanded to `$HOME`.
    pub async fn open(name: impl Into<String>, log_dir: &str) -> Result<Self, ChatError> {
        let name = name.into();
        let log_path = log_file_path(&name, log_dir)?;
        info!("Log file location: {}", log_path.display());

        let log_file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&log_path)
            .await
            .map_err(|source| ChatError::LogFile {
                path: log_path.clone(),
                source,
            })?;

        Ok(Self {
            prompt: message::prompt(&name),
            name,
            log_path,
            log_file: Mutex::new(log_file),
            online_users: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of users currently online
    pub async fn online_count(&self) -> usize {
        self.online_users.lock().await.len()
    }

    /// Run a client session from handshake to logout
    ///
    /// Asks for a display name, announces the user, then handles lines
    /// until the client exits or the channel fails. A read failure logs
    /// the user out and is returned to the caller; `/exit` returns `Ok`.
    pub async fn join(
        &self,
        channel: Arc<Channel<S>>,
        remote_addr: SocketAddr,
    ) -> Result<(), ChatError> {
        channel.write(&message::welcome(&self.name)).await;

        // Control-only payloads read as empty lines; ask again
        let name = loop {
            let name = channel.read_line().await?;
            if !name.is_empty() {
                break name;
            }
            channel.write(message::name_prompt()).await;
        };

        info!("{:?} joined from {}", name, remote_addr);
        let user = User::new(name, channel);

        self.add_user(user.clone()).await;
        self.send_notice(&message::joined(&user.name)).await;

        loop {
            user.channel.write(&self.prompt).await;

            let input = match user.channel.read_line().await {
                Ok(input) => input,
                Err(e) => {
                    self.logout(&user.name, &user.channel).await;
                    return Err(e);
                }
            };

            user.channel.erase_echo().await;

            if input.is_empty() {
                continue;
            }

            match Command::parse(&input) {
                Some(command) => {
                    if self.handle_command(command, &user).await.is_break() {
                        return Ok(());
                    }
                }
                None => self.send_chat(&user.name, &input).await,
            }
        }
    }

    /// Dispatch a command; replies go to the issuing user only
    async fn handle_command(&self, command: Command, user: &User<S>) -> ControlFlow<()> {
        match command {
            Command::Help => user.channel.write(message::HELP_TEXT).await,
            Command::Exit => {
                self.logout(&user.name, &user.channel).await;
                return ControlFlow::Break(());
            }
            Command::Online => {
                let count = self.online_count().await;
                user.channel.write(&message::online_count(count)).await;
            }
            Command::Unknown(word) => {
                debug!("Unknown command {:?} from {:?}", word, user.name);
                user.channel.write(message::UNKNOWN_COMMAND).await;
            }
        }
        ControlFlow::Continue(())
    }

    async fn add_user(&self, user: User<S>) {
        let mut users = self.online_users.lock().await;
        users.push(user);
        debug!("Users online: {}", users.len());
    }

    /// Close the channel, drop the user from the room and announce it
    ///
    /// Removes the first member with a matching name. Duplicate names
    /// are not supported: with two "bob"s the earlier one goes.
    async fn logout(&self, name: &str, channel: &Channel<S>) {
        {
            let mut users = self.online_users.lock().await;

            if let Err(e) = channel.close().await {
                debug!("Closing channel for {:?}: {}", name, e);
            }

            match users.iter().position(|u| u.name == name) {
                Some(index) => {
                    users.remove(index);
                }
                None => debug!("Logout for {:?} who is not online", name),
            }
        }

        info!("{:?} left", name);
        self.send_notice(&message::left(name)).await;
    }

    async fn send_chat(&self, from: &str, text: &str) {
        self.broadcast(message::chat_record(from, text)).await;
    }

    async fn send_notice(&self, text: &str) {
        self.broadcast(message::notice_record(text)).await;
    }

    /// Deliver a record to every online user, then append it to the log
    ///
    /// One task per recipient; waits for all of them before logging, so
    /// a slow client delays the whole room but never blocks delivery to
    /// the others.
    async fn broadcast(&self, record: String) {
        let recipients = self.online_users.lock().await.clone();
        let record: Arc<str> = record.into();

        let deliveries = recipients.into_iter().map(|user| {
            let record = Arc::clone(&record);
            let prompt = self.prompt.clone();
            tokio::spawn(async move {
                user.channel.write(&record).await;
                user.channel.write(&prompt).await;
            })
        });

        for result in join_all(deliveries).await {
            if let Err(e) = result {
                warn!("Broadcast delivery task failed: {}", e);
            }
        }

        self.append_to_log(&record).await;
    }

    /// Append one record to the transcript and sync it to disk
    async fn append_to_log(&self, record: &str) {
        let mut file = self.log_file.lock().await;

        if let Err(e) = file.write_all(record.as_bytes()).await {
            error!("Error writing to log file: {}", e);
        }
        if let Err(e) = file.flush().await {
            error!("Error flushing data to log file: {}", e);
        }
        if let Err(e) = file.sync_all().await {
            error!("Error syncing log file: {}", e);
        }
    }
}

/// Build the transcript path for a room
fn log_file_path(room_name: &str, log_dir: &str) -> Result<PathBuf, ChatError> {
    let dir = expand_home(log_dir).ok_or_else(|| ChatError::LogFile {
        path: PathBuf::from(log_dir),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "HOME is not set"),
    })?;

    let file_name = format!("{}.{}", room_name.replace(' ', "_"), LOG_FILE_EXTENSION);
    Ok(dir.join(file_name))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> Option<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else {
        return Some(PathBuf::from(path));
    };
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(rest.trim_start_matches('/')))
}

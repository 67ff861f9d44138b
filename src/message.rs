//! Command parsing and transcript formatting
//!
//! Client input is plain text; lines starting with `/` are commands.
//! Everything the room broadcasts is formatted here as one transcript
//! record, terminated with CR LF.

use chrono::Local;

use crate::channel::CRLF;

/// Marks a line as a command rather than chat text
pub const COMMAND_MARKER: char = '/';

/// Timestamp format used in every transcript record
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Help text sent in reply to `/help`
pub const HELP_TEXT: &str = "Commands:\r\n/exit - log out\r\n/online - shows how many users online\r\n";

/// Reply to an unrecognised command
pub const UNKNOWN_COMMAND: &str = "ERROR: unknown command\r\n";

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the list of commands
    Help,
    /// Log out of the room
    Exit,
    /// Show how many users are online
    Online,
    /// Anything else after the marker
    Unknown(String),
}

impl Command {
    /// Parse a line of input as a command
    ///
    /// Returns None if the line does not start with the command marker.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.strip_prefix(COMMAND_MARKER)?;
        Some(match word {
            "help" => Command::Help,
            "exit" => Command::Exit,
            "online" => Command::Online,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Greeting sent on connect, ending with the name question
pub fn welcome(room: &str) -> String {
    format!("Welcome to {} chat.{}What's your name: ", room, CRLF)
}

/// Asked again when the first answer was empty
pub fn name_prompt() -> &'static str {
    "What's your name: "
}

/// Input prompt shown after every message
pub fn prompt(room: &str) -> String {
    format!("#{}> ", room)
}

/// Reply to `/online`
pub fn online_count(count: usize) -> String {
    format!("{} users online{}", count, CRLF)
}

pub fn joined(name: &str) -> String {
    format!("{} joined!", name)
}

pub fn left(name: &str) -> String {
    format!("{} left!", name)
}

/// Format a chat message record: `<ts> - <from> >> <text>`
pub fn chat_record(from: &str, text: &str) -> String {
    format!("{} - {} >> {}{}", timestamp(), from, text, CRLF)
}

/// Format a room notice record: `<ts> = <text>`
pub fn notice_record(text: &str) -> String {
    format!("{} = {}{}", timestamp(), text, CRLF)
}

fn timestamp() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

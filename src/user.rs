//! User struct definition
//!
//! Associates a display name with the channel of one connected client.

use std::sync::Arc;

use crate::channel::Channel;

/// Connected user information
///
/// The room keeps its own copy of each `User` in the membership list;
/// the channel itself is shared with the session that owns the reads.
pub struct User<S> {
    /// Display name chosen during the handshake (not necessarily unique)
    pub name: String,
    /// Channel to this user's client
    pub channel: Arc<Channel<S>>,
}

impl<S> User<S> {
    /// Create a new user with the given name and channel
    pub fn new(name: impl Into<String>, channel: Arc<Channel<S>>) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }
}

impl<S> Clone for User<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<S> std::fmt::Debug for User<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User").field("name", &self.name).finish()
    }
}

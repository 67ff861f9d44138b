//! Session identity
//!
//! Display names are chosen by clients and may repeat, so every accepted
//! connection also gets a `SessionId`. It goes on the tracing span for
//! that connection, letting the lines of one session be picked out of
//! the server log.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Fresh random id for a newly accepted connection
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_each_connection_gets_its_own_session() {
        let sessions: HashSet<SessionId> = (0..100).map(|_| SessionId::new()).collect();
        assert_eq!(sessions.len(), 100);
    }

    #[test]
    fn test_session_renders_as_hyphenated_uuid() {
        let session = SessionId::new();
        let rendered = session.to_string();

        assert_eq!(rendered.len(), 36);
        assert_eq!(Uuid::parse_str(&rendered).unwrap(), session.0);
    }
}

//! Store sessions.
//!
//! Every engine operation runs inside exactly one session, opened when the
//! operation starts and closed on every exit path.

use serde::{Deserialize, Serialize};

/// Session access mode. The engine only ever opens read sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    ReadOnly,
    ReadWrite,
}

impl SessionMode {
    /// Whether closing the session keeps what it ran.
    pub fn commits_on_close(self) -> bool {
        matches!(self, SessionMode::ReadWrite)
    }
}

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Session trait that all stores must implement.
pub trait StoreSession: Send + Sync {
    fn mode(&self) -> SessionMode;
    fn id(&self) -> SessionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_write_sessions_commit() {
        assert!(!SessionMode::ReadOnly.commits_on_close());
        assert!(SessionMode::ReadWrite.commits_on_close());
    }
}

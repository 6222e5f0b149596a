//! Session identity, lifecycle state and abort reasons.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an automation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
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

/// Lifecycle state of an emulator session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// No emulator has been started yet
    Cold,
    /// Emulator is running and being monitored
    Running,
    /// Emulator was shut down on request
    Terminated,
    /// Emulator went away on its own or was killed after a fatal error
    Aborted,
}

/// Why a session was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// The emulator exited while no shutdown or restart was requested
    UnexpectedExit {
        /// Exit code, if the platform reported one
        code: Option<i32>,
    },
    /// A fatal console pattern was seen and the emulator was killed
    FatalError,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::UnexpectedExit { code: Some(code) } => {
                write!(f, "emulator exited unexpectedly (exit code {code})")
            }
            AbortReason::UnexpectedExit { code: None } => {
                write!(f, "emulator exited unexpectedly")
            }
            AbortReason::FatalError => write!(f, "irrecoverable emulator error, emulator killed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_creation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new();
        let display = format!("{id}");
        assert_eq!(display.len(), 36);
    }

    #[test]
    fn test_abort_reason_display() {
        assert_eq!(
            AbortReason::UnexpectedExit { code: None }.to_string(),
            "emulator exited unexpectedly"
        );
        assert_eq!(
            AbortReason::FatalError.to_string(),
            "irrecoverable emulator error, emulator killed"
        );
    }

    #[test]
    fn test_session_state_serialization() {
        let json = serde_json::to_string(&SessionState::Running).unwrap();
        assert_eq!(json, "\"Running\"");
    }
}

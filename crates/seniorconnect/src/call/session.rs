//! Call session identity and lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Opaque identity of one outbound call attempt.
///
/// Distinct from any volunteer or user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh session id.
    #[must_use]
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
        self.0.fmt(f)
    }
}

/// Lifecycle state of a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// No call.
    Idle,
    /// Start requested, provider has not reported progress yet.
    Starting,
    /// Provider reports the call is connecting.
    Connecting,
    /// Call is connected.
    Active,
    /// End requested, waiting for confirmation.
    Ending,
    /// Call ended normally.
    Ended,
    /// Call failed or timed out.
    Failed,
}

impl CallState {
    /// Whether the session is waiting on the provider and therefore carries a
    /// deadline.
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Starting | Self::Connecting | Self::Ending)
    }

    /// Whether the session is finished and about to be cleared.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal step.
    ///
    /// Any state may drop straight to `Idle` (provider reset).
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use CallState::{Active, Connecting, Ended, Ending, Failed, Idle, Starting};

        match (self, next) {
            (_, Idle) => true,
            (Idle, Starting) => true,
            (Starting, Connecting) | (Connecting, Active) => true,
            (Starting | Connecting | Active, Ending) => true,
            (Starting | Connecting | Active | Ending, Ended | Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Ending => "ending",
            Self::Ended => "ended",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The one call currently being tracked.
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Session identity.
    pub id: SessionId,
    /// Number being called; copied at match time.
    pub target_phone_number: String,
    /// Name shown for the other party.
    pub contact_display_name: String,
    /// Current lifecycle state.
    pub state: CallState,
    /// When the call was requested.
    pub started_at: DateTime<Utc>,
    /// When the pending provider step times out.
    pub(crate) deadline: Option<Instant>,
}

impl CallSession {
    pub(crate) fn new(target_phone_number: &str, contact_display_name: &str) -> Self {
        Self {
            id: SessionId::new(),
            target_phone_number: target_phone_number.to_string(),
            contact_display_name: contact_display_name.to_string(),
            state: CallState::Idle,
            started_at: Utc::now(),
            deadline: None,
        }
    }

    /// Deadline of the pending provider step, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CallState::Starting.to_string(), "starting");
        assert_eq!(CallState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_pending_and_terminal() {
        assert!(CallState::Starting.is_pending());
        assert!(CallState::Ending.is_pending());
        assert!(!CallState::Active.is_pending());
        assert!(CallState::Ended.is_terminal());
        assert!(CallState::Failed.is_terminal());
        assert!(!CallState::Idle.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions_are_legal() {
        let path = [
            CallState::Idle,
            CallState::Starting,
            CallState::Connecting,
            CallState::Active,
            CallState::Ending,
            CallState::Ended,
            CallState::Idle,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!CallState::Idle.can_transition_to(CallState::Active));
        assert!(!CallState::Starting.can_transition_to(CallState::Active));
        assert!(!CallState::Ended.can_transition_to(CallState::Active));
        assert!(!CallState::Failed.can_transition_to(CallState::Starting));
        assert!(!CallState::Active.can_transition_to(CallState::Connecting));
    }

    #[test]
    fn test_any_state_can_reset() {
        for state in [
            CallState::Starting,
            CallState::Connecting,
            CallState::Active,
            CallState::Ending,
            CallState::Ended,
            CallState::Failed,
        ] {
            assert!(state.can_transition_to(CallState::Idle));
        }
    }

    #[test]
    fn test_new_session() {
        let session = CallSession::new("555", "Ann");
        assert_eq!(session.state, CallState::Idle);
        assert_eq!(session.target_phone_number, "555");
        assert!(session.deadline().is_none());
    }
}

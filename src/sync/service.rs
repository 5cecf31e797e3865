//! The authoritative service boundary: one trait, two error classes.

use crate::models::{CourtId, MatchId, MatchStatus, Side, Slot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote call failure. Conflicts are recoverable state disagreements;
/// transport failures are transient and retryable. Neither is fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServiceError {
    /// The service refused the mutation for the current remote state
    /// (e.g. next game requested while the current game is incomplete).
    Conflict(String),
    /// The call did not complete; the optimistic patch must be rolled back.
    Transport(String),
}

impl ServiceError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict(_))
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Conflict(msg) => write!(f, "Service conflict: {}", msg),
            ServiceError::Transport(msg) => write!(f, "Transport failure: {}", msg),
        }
    }
}

/// Partial serve update: only the fields present are written, last write per
/// field wins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<Slot>,
}

/// Mutating operations of the authoritative scoring service, keyed by match
/// id. Each is idempotent for a given resulting state, so retries are safe.
#[async_trait]
pub trait ScoreService: Send + Sync {
    async fn increment_point(
        &self,
        match_id: MatchId,
        side: Side,
        delta: i32,
        auto_next: bool,
    ) -> Result<(), ServiceError>;

    async fn set_game_score(
        &self,
        match_id: MatchId,
        game_index: usize,
        a: u32,
        b: u32,
        auto_next: bool,
    ) -> Result<(), ServiceError>;

    async fn set_status(&self, match_id: MatchId, status: MatchStatus) -> Result<(), ServiceError>;

    async fn set_winner(&self, match_id: MatchId, winner: Option<Side>)
        -> Result<(), ServiceError>;

    /// Open the next game. Responds with a conflict when the current game is
    /// incomplete and `auto_next` is false.
    async fn next_game(&self, match_id: MatchId, auto_next: bool) -> Result<(), ServiceError>;

    async fn set_serve(&self, match_id: MatchId, patch: ServePatch) -> Result<(), ServiceError>;

    async fn assign_court(&self, match_id: MatchId, court_id: CourtId) -> Result<(), ServiceError>;

    async fn unassign_court(
        &self,
        match_id: MatchId,
        court_id: Option<CourtId>,
    ) -> Result<(), ServiceError>;
}

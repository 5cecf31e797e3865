//! ScoreSync: optimistic local mutation plus remote reconciliation.
//!
//! Each mutating operation validates and applies the local patch through the
//! pure logic first, then issues the equivalent remote call. A remote failure
//! restores the pre-patch aggregate wholesale (never partially). Local
//! refusals never reach the wire.

use crate::logic;
use crate::models::{CourtId, GameScore, MatchError, MatchRecord, MatchStatus, Side};
use crate::sync::push::{apply_push, PushEvent};
use crate::sync::service::{ScoreService, ServePatch, ServiceError};
use std::sync::Arc;

/// Failure of a synchronized operation. Local errors are refused before any
/// remote call; remote errors arrive after the local patch was rolled back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyncError {
    Local(MatchError),
    Remote(ServiceError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Local(e) => write!(f, "{}", e),
            SyncError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl From<MatchError> for SyncError {
    fn from(e: MatchError) -> Self {
        SyncError::Local(e)
    }
}

impl From<ServiceError> for SyncError {
    fn from(e: ServiceError) -> Self {
        SyncError::Remote(e)
    }
}

/// One match aggregate bridged to the authoritative service.
pub struct ScoreSync<S: ScoreService> {
    record: MatchRecord,
    service: Arc<S>,
    /// When set, the authoritative service opens follow-up games on its own
    /// and the local next-game gate is skipped.
    auto_next: bool,
}

impl<S: ScoreService> ScoreSync<S> {
    pub fn new(record: MatchRecord, service: Arc<S>) -> Self {
        Self {
            record,
            service,
            auto_next: false,
        }
    }

    pub fn with_auto_next(mut self, auto_next: bool) -> Self {
        self.auto_next = auto_next;
        self
    }

    /// Current local view of the match (optimistic state included).
    pub fn state(&self) -> &MatchRecord {
        &self.record
    }

    /// Fold an inbound push event into local state. Push always wins.
    pub fn apply_push(&mut self, event: &PushEvent) -> bool {
        apply_push(&mut self.record, event)
    }

    /// Roll the aggregate back to its pre-patch snapshot.
    fn rollback(&mut self, snapshot: MatchRecord, err: ServiceError) -> SyncError {
        self.record = snapshot;
        SyncError::Remote(err)
    }

    /// Start the match (scheduled → live).
    pub async fn start(&mut self) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        logic::start_match(&mut self.record)?;
        match self
            .service
            .set_status(self.record.id, MatchStatus::Live)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Apply a signed point delta to the current game.
    pub async fn increment_point(&mut self, side: Side, delta: i32) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        logic::increment_point(&mut self.record, side, delta)?;
        match self
            .service
            .increment_point(self.record.id, side, delta, self.auto_next)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Set one game's score directly.
    pub async fn set_game_score(
        &mut self,
        game_index: usize,
        a: u32,
        b: u32,
    ) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        logic::set_game_score(&mut self.record, game_index, a, b)?;
        match self
            .service
            .set_game_score(self.record.id, game_index, a, b, self.auto_next)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Open the next game. Locally gated on the current game being complete
    /// unless auto-next is on; the service applies the same gate remotely.
    pub async fn next_game(&mut self) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        logic::start_next_game(&mut self.record, self.auto_next)?;
        match self.service.next_game(self.record.id, self.auto_next).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Administratively close the current game, writing the reconstructed
    /// (or verbatim) score to the service.
    pub async fn early_finalize_game(
        &mut self,
        winner: Option<Side>,
        keep_current_score: bool,
    ) -> Result<GameScore, SyncError> {
        let snapshot = self.record.clone();
        let recorded = logic::early_finalize_game(&mut self.record, winner, keep_current_score)?;
        let index = self.record.current_game_index();
        match self
            .service
            .set_game_score(self.record.id, index, recorded.a, recorded.b, self.auto_next)
            .await
        {
            Ok(()) => Ok(recorded),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Tally games, decide the winner, close the match. Pushes the winner
    /// (when decided) and the finished status to the service; failure of
    /// either call rolls back the whole patch.
    pub async fn finalize(&mut self) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        logic::finalize_match(&mut self.record)?;
        if let Some(winner) = self.record.winner {
            if let Err(e) = self.service.set_winner(self.record.id, Some(winner)).await {
                return Err(self.rollback(snapshot, e));
            }
        }
        match self
            .service
            .set_status(self.record.id, MatchStatus::Finished)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Explicit winner override (referee decision). Used ahead of a tied
    /// tally so `finalize` preserves it.
    pub async fn set_winner(&mut self, winner: Option<Side>) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        self.record.winner = winner;
        match self.service.set_winner(self.record.id, winner).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    /// Partial serve update; only the supplied fields change.
    pub async fn set_serve(&mut self, patch: ServePatch) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        if let Some(side) = patch.side {
            self.record.serve.side = side;
        }
        if let Some(server) = patch.server {
            self.record.serve.server = server;
        }
        match self.service.set_serve(self.record.id, patch).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    pub async fn assign_court(&mut self, court_id: CourtId) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        self.record.court = Some(court_id);
        match self.service.assign_court(self.record.id, court_id).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }

    pub async fn unassign_court(&mut self) -> Result<(), SyncError> {
        let snapshot = self.record.clone();
        let previous = self.record.court.take();
        match self.service.unassign_court(self.record.id, previous).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.rollback(snapshot, e)),
        }
    }
}

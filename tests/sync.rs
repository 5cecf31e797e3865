//! Sync adapter tests: optimistic apply, full rollback, local refusal, and
//! push-event merge.

use async_trait::async_trait;
use racket_score_console::{
    apply_push, start_match, CourtId, GameScore, MatchError, MatchId, MatchPatch, MatchRecord,
    MatchStatus, PushEvent, RulesConfig, ScoreService, ScoreSync, ServePatch, ServiceError, Side,
    Slot, SyncError,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory stand-in for the authoritative service: records calls, fails on
/// demand (optionally only for one named operation).
#[derive(Default)]
struct MockService {
    calls: Mutex<Vec<String>>,
    fail_with: Mutex<Option<(Option<&'static str>, ServiceError)>>,
}

impl MockService {
    fn fail_all(&self, err: ServiceError) {
        *self.fail_with.lock().unwrap() = Some((None, err));
    }

    fn fail_only(&self, op: &'static str, err: ServiceError) {
        *self.fail_with.lock().unwrap() = Some((Some(op), err));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(op.to_string());
        if let Some((only, err)) = self.fail_with.lock().unwrap().as_ref() {
            if only.is_none() || *only == Some(op) {
                return Err(err.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreService for MockService {
    async fn increment_point(
        &self,
        _match_id: MatchId,
        _side: Side,
        _delta: i32,
        _auto_next: bool,
    ) -> Result<(), ServiceError> {
        self.record("increment_point")
    }

    async fn set_game_score(
        &self,
        _match_id: MatchId,
        _game_index: usize,
        _a: u32,
        _b: u32,
        _auto_next: bool,
    ) -> Result<(), ServiceError> {
        self.record("set_game_score")
    }

    async fn set_status(
        &self,
        _match_id: MatchId,
        _status: MatchStatus,
    ) -> Result<(), ServiceError> {
        self.record("set_status")
    }

    async fn set_winner(
        &self,
        _match_id: MatchId,
        _winner: Option<Side>,
    ) -> Result<(), ServiceError> {
        self.record("set_winner")
    }

    async fn next_game(&self, _match_id: MatchId, _auto_next: bool) -> Result<(), ServiceError> {
        self.record("next_game")
    }

    async fn set_serve(&self, _match_id: MatchId, _patch: ServePatch) -> Result<(), ServiceError> {
        self.record("set_serve")
    }

    async fn assign_court(
        &self,
        _match_id: MatchId,
        _court_id: CourtId,
    ) -> Result<(), ServiceError> {
        self.record("assign_court")
    }

    async fn unassign_court(
        &self,
        _match_id: MatchId,
        _court_id: Option<CourtId>,
    ) -> Result<(), ServiceError> {
        self.record("unassign_court")
    }
}

fn live_record() -> MatchRecord {
    let rules = RulesConfig {
        win_by_two: true,
        ..RulesConfig::default()
    };
    let mut m = MatchRecord::new(rules);
    start_match(&mut m).unwrap();
    m
}

fn synced() -> (ScoreSync<MockService>, Arc<MockService>) {
    let service = Arc::new(MockService::default());
    (ScoreSync::new(live_record(), service.clone()), service)
}

#[tokio::test]
async fn increment_applies_locally_and_calls_remote() {
    let (mut sync, service) = synced();
    sync.increment_point(Side::A, 1).await.unwrap();
    assert_eq!(sync.state().current_game().a, 1);
    assert_eq!(service.calls(), vec!["increment_point"]);
}

#[tokio::test]
async fn transport_failure_rolls_back_in_full() {
    let (mut sync, service) = synced();
    sync.increment_point(Side::A, 1).await.unwrap();
    let before = sync.state().clone();

    service.fail_all(ServiceError::Transport("connection reset".into()));
    let err = sync.increment_point(Side::A, 1).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Remote(ServiceError::Transport(_))
    ));
    // The whole aggregate is back to its pre-patch state.
    assert_eq!(*sync.state(), before);
}

#[tokio::test]
async fn local_refusal_never_reaches_the_wire() {
    let (mut sync, service) = synced();
    sync.increment_point(Side::A, 2).await.unwrap();
    sync.increment_point(Side::B, 2).await.unwrap();
    service.calls.lock().unwrap().clear();

    // Tied score, no explicit winner: refused before any remote call.
    let err = sync.early_finalize_game(None, false).await.unwrap_err();
    assert_eq!(err, SyncError::Local(MatchError::TieBreakRequired));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn next_game_conflict_is_recoverable() {
    let (mut sync, service) = synced();
    let err = sync.next_game().await.unwrap_err();
    assert_eq!(err, SyncError::Local(MatchError::GameIncomplete));
    assert!(service.calls().is_empty());
    assert_eq!(sync.state().games.len(), 1);

    // Complete the game, then the transition goes through.
    sync.set_game_score(0, 11, 6).await.unwrap();
    sync.next_game().await.unwrap();
    assert_eq!(sync.state().games.len(), 2);
}

#[tokio::test]
async fn remote_conflict_is_distinguishable_and_rolls_back() {
    let (mut sync, service) = synced();
    sync.set_game_score(0, 11, 5).await.unwrap();

    // Local gate passes, but the service already advanced past this game.
    service.fail_all(ServiceError::Conflict("game already advanced".into()));
    let err = sync.next_game().await.unwrap_err();
    match err {
        SyncError::Remote(remote) => assert!(remote.is_conflict()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(sync.state().games.len(), 1);
}

#[tokio::test]
async fn auto_next_defers_the_gate_to_the_service() {
    let service = Arc::new(MockService::default());
    let mut sync = ScoreSync::new(live_record(), service.clone()).with_auto_next(true);
    sync.next_game().await.unwrap();
    assert_eq!(sync.state().games.len(), 2);
    assert_eq!(service.calls(), vec!["next_game"]);
}

#[tokio::test]
async fn early_finalize_writes_reconstructed_score() {
    let (mut sync, service) = synced();
    sync.set_game_score(0, 8, 5).await.unwrap();
    let game = sync.early_finalize_game(Some(Side::A), false).await.unwrap();
    assert_eq!((game.a, game.b), (11, 5));
    assert_eq!(
        service.calls(),
        vec!["set_game_score", "set_game_score"],
    );
}

#[tokio::test]
async fn finalize_pushes_winner_then_status() {
    let (mut sync, service) = synced();
    sync.set_game_score(0, 11, 5).await.unwrap();
    sync.next_game().await.unwrap();
    sync.set_game_score(1, 11, 9).await.unwrap();
    service.calls.lock().unwrap().clear();

    sync.finalize().await.unwrap();
    assert_eq!(sync.state().status, MatchStatus::Finished);
    assert_eq!(sync.state().winner, Some(Side::A));
    assert_eq!(service.calls(), vec!["set_winner", "set_status"]);
}

#[tokio::test]
async fn finalize_rolls_back_when_status_write_fails() {
    let (mut sync, service) = synced();
    sync.set_game_score(0, 11, 5).await.unwrap();
    sync.next_game().await.unwrap();
    sync.set_game_score(1, 11, 9).await.unwrap();
    let before = sync.state().clone();

    // First remote call (set_winner) succeeds, second (set_status) fails:
    // the optimistic patch still reverts wholesale.
    service.fail_only("set_status", ServiceError::Transport("timeout".into()));
    sync.finalize().await.unwrap_err();
    assert_eq!(*sync.state(), before);
    assert_eq!(sync.state().status, MatchStatus::Live);
    assert_eq!(sync.state().winner, None);
}

#[tokio::test]
async fn winner_override_survives_tied_finalize() {
    let (mut sync, _service) = synced();
    sync.set_game_score(0, 11, 5).await.unwrap();
    sync.next_game().await.unwrap();
    sync.set_game_score(1, 5, 11).await.unwrap();

    // One game each; the referee decides.
    sync.set_winner(Some(Side::B)).await.unwrap();
    sync.finalize().await.unwrap();
    assert_eq!(sync.state().winner, Some(Side::B));
    assert_eq!(sync.state().status, MatchStatus::Finished);
}

#[tokio::test]
async fn serve_patch_updates_only_given_fields() {
    let (mut sync, _service) = synced();
    sync.set_serve(ServePatch {
        side: Some(Side::B),
        server: None,
    })
    .await
    .unwrap();
    assert_eq!(sync.state().serve.side, Side::B);
    assert_eq!(sync.state().serve.server, Slot::One);

    sync.set_serve(ServePatch {
        side: None,
        server: Some(Slot::Two),
    })
    .await
    .unwrap();
    assert_eq!(sync.state().serve.side, Side::B);
    assert_eq!(sync.state().serve.server, Slot::Two);
}

#[tokio::test]
async fn court_assignment_round_trip() {
    let (mut sync, service) = synced();
    let court = Uuid::new_v4();
    sync.assign_court(court).await.unwrap();
    assert_eq!(sync.state().court, Some(court));
    sync.unassign_court().await.unwrap();
    assert_eq!(sync.state().court, None);
    assert_eq!(service.calls(), vec!["assign_court", "unassign_court"]);
}

#[test]
fn push_merge_is_field_scoped() {
    let mut m = live_record();
    m.games = vec![GameScore::new(7, 4)];
    let match_id = m.id;

    let applied = apply_push(
        &mut m,
        &PushEvent::MatchPatched {
            match_id,
            patch: MatchPatch {
                status: Some(MatchStatus::Finished),
                winner: Some(Side::A),
                ..MatchPatch::default()
            },
        },
    );
    assert!(applied);
    assert_eq!(m.status, MatchStatus::Finished);
    assert_eq!(m.winner, Some(Side::A));
    // Untouched fields survive the patch.
    assert_eq!((m.games[0].a, m.games[0].b), (7, 4));
}

#[test]
fn push_score_carries_resulting_values_and_is_idempotent() {
    let mut m = live_record();
    let event = PushEvent::ScoreInc {
        match_id: m.id,
        game_index: 0,
        a: 5,
        b: 3,
        capped: None,
    };
    apply_push(&mut m, &event);
    apply_push(&mut m, &event);
    // At-least-once delivery: re-applying changes nothing.
    assert_eq!((m.games[0].a, m.games[0].b), (5, 3));
}

#[test]
fn push_score_beyond_known_games_extends_the_list() {
    let mut m = live_record();
    let match_id = m.id;
    apply_push(
        &mut m,
        &PushEvent::ScoreInc {
            match_id,
            game_index: 2,
            a: 1,
            b: 0,
            capped: Some(false),
        },
    );
    assert_eq!(m.games.len(), 3);
    assert_eq!(m.games[2].a, 1);
}

#[test]
fn push_for_another_match_is_ignored() {
    let mut m = live_record();
    let applied = apply_push(
        &mut m,
        &PushEvent::StatusUpdated {
            match_id: Uuid::new_v4(),
            status: MatchStatus::Finished,
        },
    );
    assert!(!applied);
    assert_eq!(m.status, MatchStatus::Live);
}

#[tokio::test]
async fn push_supersedes_optimistic_state() {
    let (mut sync, _service) = synced();
    sync.increment_point(Side::A, 1).await.unwrap();

    // The authoritative answer disagrees; it wins.
    let id = sync.state().id;
    sync.apply_push(&PushEvent::ScoreInc {
        match_id: id,
        game_index: 0,
        a: 0,
        b: 1,
        capped: None,
    });
    assert_eq!((sync.state().current_game().a, sync.state().current_game().b), (0, 1));
}

#[test]
fn push_events_use_tagged_wire_names() {
    let json = r#"{"type":"serve:set","match_id":"6f0a1f7e-0000-4000-8000-000000000000","server":2}"#;
    let event: PushEvent = serde_json::from_str(json).unwrap();
    match event {
        PushEvent::ServeSet { side, server, .. } => {
            assert_eq!(side, None);
            assert_eq!(server, Some(Slot::Two));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let event = PushEvent::WinnerUpdated {
        match_id: Uuid::nil(),
        winner: None,
    };
    let encoded = serde_json::to_string(&event).unwrap();
    assert!(encoded.contains(r#""type":"winner:updated""#));
}

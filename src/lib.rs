//! Racket-sport live scoring: match engine, authoritative-service sync, referee console.

pub mod logic;
pub mod models;
pub mod sync;

pub use logic::{
    current_slot, current_slot_of, early_finalize_game, finalize_match, game_winner, games_won,
    increment_point, is_game_win, match_point_reached, minimal_winning_score, required_game_wins,
    set_game_score, start_match, start_next_game,
};
pub use models::{
    Cap, CapMode, CourtId, GameScore, MatchError, MatchId, MatchRecord, MatchStatus,
    ParticipantId, RulesConfig, ServeState, Side, SideSlots, Slot,
};
pub use sync::{
    apply_push, HttpScoreService, MatchPatch, PushEvent, ScoreService, ScoreSync, ServePatch,
    ServiceError, SyncError,
};

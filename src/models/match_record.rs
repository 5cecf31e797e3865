//! MatchRecord: the single owned aggregate per match id, plus MatchError.

use crate::models::rules::RulesConfig;
use crate::models::score::{GameScore, Side, Slot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a participant (player).
pub type ParticipantId = Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

/// Errors from the pure scoring layer. All recoverable; nothing here is fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchError {
    /// The match is not in a status that allows this action.
    InvalidState,
    /// The match is finished; scores are immutable.
    MatchFinished,
    /// Opening the next game requires the current game to be complete (conflict-class).
    GameIncomplete,
    /// Early finalize attempted on a tied score with no explicit winner.
    TieBreakRequired,
    /// Game index outside the recorded games.
    GameOutOfRange { index: usize, len: usize },
    /// Ruleset violates a structural invariant.
    InvalidRules(String),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::InvalidState => write!(f, "Invalid match status for this action"),
            MatchError::MatchFinished => write!(f, "Match is finished; scores are immutable"),
            MatchError::GameIncomplete => {
                write!(f, "Current game must be completed or early-finalized first")
            }
            MatchError::TieBreakRequired => {
                write!(f, "Score is tied; an explicit winner is required")
            }
            MatchError::GameOutOfRange { index, len } => {
                write!(f, "Game index {} out of range ({} games recorded)", index, len)
            }
            MatchError::InvalidRules(reason) => write!(f, "Invalid ruleset: {}", reason),
        }
    }
}

/// Lifecycle of a match. Transitions are monotonic: scheduled → live → finished.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

/// Which side serves and which of its slots currently holds the serve.
/// Mirrors the authoritative serve fields; the per-player rotation slot is
/// derived from score parity, never stored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServeState {
    pub side: Side,
    pub server: Slot,
}

/// Base slot assignment per side, fixed at match start.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SideSlots {
    pub a: HashMap<ParticipantId, Slot>,
    pub b: HashMap<ParticipantId, Slot>,
}

impl SideSlots {
    pub fn side(&self, side: Side) -> &HashMap<ParticipantId, Slot> {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Assign base slots from the listed order: first participant → slot 1,
    /// second → slot 2. Extra entries are ignored.
    pub fn assign(&mut self, side: Side, participants: &[ParticipantId]) {
        let map = match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        };
        map.clear();
        for (participant, slot) in participants.iter().zip([Slot::One, Slot::Two]) {
            map.insert(*participant, slot);
        }
    }

    /// Explicit override of one participant's base slot.
    pub fn set(&mut self, side: Side, participant: ParticipantId, slot: Slot) {
        match side {
            Side::A => self.a.insert(participant, slot),
            Side::B => self.b.insert(participant, slot),
        };
    }

    /// Base slot of a participant on the given side, if registered.
    pub fn base_slot_of(&self, side: Side, participant: ParticipantId) -> Option<Slot> {
        self.side(side).get(&participant).copied()
    }
}

/// Full per-match state: ruleset, ordered game scores, lifecycle, serve, slots.
/// The last element of `games` is the current game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub rules: RulesConfig,
    /// Ordered game scores; never empty (a zero game opens with the match).
    pub games: Vec<GameScore>,
    pub status: MatchStatus,
    /// None until decided (the wire's empty-string winner maps to null).
    pub winner: Option<Side>,
    pub serve: ServeState,
    pub slots_base: SideSlots,
    pub court: Option<CourtId>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Create a scheduled match with one zero game open.
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            rules,
            games: vec![GameScore::default()],
            status: MatchStatus::Scheduled,
            winner: None,
            serve: ServeState::default(),
            slots_base: SideSlots::default(),
            court: None,
            scheduled_at: None,
        }
    }

    /// The game currently open (last recorded).
    pub fn current_game(&self) -> &GameScore {
        // `games` is never empty: constructed with one game, only ever pushed to.
        self.games.last().unwrap_or(&EMPTY_GAME)
    }

    pub fn current_game_mut(&mut self) -> &mut GameScore {
        if self.games.is_empty() {
            self.games.push(GameScore::default());
        }
        let last = self.games.len() - 1;
        &mut self.games[last]
    }

    /// Index of the current game.
    pub fn current_game_index(&self) -> usize {
        self.games.len().saturating_sub(1)
    }
}

static EMPTY_GAME: GameScore = GameScore {
    a: 0,
    b: 0,
    capped: false,
};

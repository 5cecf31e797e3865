//! Data structures for live scoring: rulesets, game scores, and the match aggregate.

mod match_record;
mod rules;
mod score;

pub use match_record::{
    CourtId, MatchError, MatchId, MatchRecord, MatchStatus, ParticipantId, ServeState, SideSlots,
};
pub use rules::{Cap, CapMode, RulesConfig};
pub use score::{GameScore, Side, Slot};

//! Inbound push events and field-level merge into the local aggregate.
//!
//! Delivery is at-least-once, so every event carries resulting values rather
//! than deltas and merging is idempotent. Only the fields an event carries
//! are written; everything else is left untouched.

use crate::models::{CourtId, GameScore, MatchId, MatchRecord, MatchStatus, ServeState, Side, Slot};
use serde::{Deserialize, Serialize};

/// Field-scoped partial update of a match. Absent fields are not merged.
/// (`winner` cannot be cleared through a patch; clearing arrives as a
/// `winner:updated` event with a null winner.)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<GameScore>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serve: Option<ServeState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<CourtId>,
}

/// Push events from the authoritative service. Tagged on the wire with the
/// event name in `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PushEvent {
    #[serde(rename = "status:updated")]
    StatusUpdated {
        match_id: MatchId,
        status: MatchStatus,
    },
    #[serde(rename = "winner:updated")]
    WinnerUpdated {
        match_id: MatchId,
        winner: Option<Side>,
    },
    #[serde(rename = "match:patched")]
    MatchPatched {
        match_id: MatchId,
        #[serde(flatten)]
        patch: MatchPatch,
    },
    /// Resulting score of one game after a point change (not the delta).
    #[serde(rename = "score:inc")]
    ScoreInc {
        match_id: MatchId,
        game_index: usize,
        a: u32,
        b: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capped: Option<bool>,
    },
    #[serde(rename = "serve:set")]
    ServeSet {
        match_id: MatchId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<Side>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        server: Option<Slot>,
    },
}

impl PushEvent {
    pub fn match_id(&self) -> MatchId {
        match self {
            PushEvent::StatusUpdated { match_id, .. }
            | PushEvent::WinnerUpdated { match_id, .. }
            | PushEvent::MatchPatched { match_id, .. }
            | PushEvent::ScoreInc { match_id, .. }
            | PushEvent::ServeSet { match_id, .. } => *match_id,
        }
    }
}

/// Merge a push event into the aggregate at field granularity. The event
/// always supersedes local optimistic state. Events for a different match id
/// are ignored; returns whether anything was applied.
pub fn apply_push(m: &mut MatchRecord, event: &PushEvent) -> bool {
    if event.match_id() != m.id {
        return false;
    }
    match event {
        PushEvent::StatusUpdated { status, .. } => {
            m.status = *status;
        }
        PushEvent::WinnerUpdated { winner, .. } => {
            m.winner = *winner;
        }
        PushEvent::MatchPatched { patch, .. } => {
            if let Some(status) = patch.status {
                m.status = status;
            }
            if let Some(winner) = patch.winner {
                m.winner = Some(winner);
            }
            if let Some(games) = &patch.games {
                m.games = games.clone();
            }
            if let Some(serve) = patch.serve {
                m.serve = serve;
            }
            if let Some(court) = patch.court {
                m.court = Some(court);
            }
        }
        PushEvent::ScoreInc {
            game_index,
            a,
            b,
            capped,
            ..
        } => {
            // Scores for games beyond the local list mean we missed a
            // next-game event; extend with zero games so the merge lands.
            while m.games.len() <= *game_index {
                m.games.push(GameScore::default());
            }
            let game = &mut m.games[*game_index];
            game.a = *a;
            game.b = *b;
            if let Some(capped) = capped {
                game.capped = *capped;
            }
        }
        PushEvent::ServeSet { side, server, .. } => {
            if let Some(side) = side {
                m.serve.side = *side;
            }
            if let Some(server) = server {
                m.serve.server = *server;
            }
        }
    }
    true
}

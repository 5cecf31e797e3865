//! Per-match ruleset: best-of, points to win, win-by-two, score cap.

use crate::models::match_record::MatchError;
use serde::{Deserialize, Serialize};

/// How the score cap behaves, if one is configured.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapMode {
    /// No cap: games run until the win condition.
    #[default]
    None,
    /// Advisory cap: shown to referees, not enforced.
    Soft,
    /// Enforced cap (by the authoritative service; this layer only mirrors it).
    Hard,
}

/// Score cap configuration. `points` must be set (and ≥ points_to_win) unless mode is None.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Cap {
    pub mode: CapMode,
    pub points: Option<u32>,
}

/// Immutable ruleset for one match. Fixed once the match opens.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Number of games in the match (odd; first to best_of/2 + 1 game wins takes it).
    #[serde(default = "default_best_of")]
    pub best_of: u32,
    /// Points needed to win a game (before any win-by-two extension).
    #[serde(default = "default_points_to_win")]
    pub points_to_win: u32,
    /// Whether a game must be won by a two-point margin.
    #[serde(default)]
    pub win_by_two: bool,
    #[serde(default)]
    pub cap: Cap,
}

fn default_best_of() -> u32 {
    3
}

fn default_points_to_win() -> u32 {
    11
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            best_of: default_best_of(),
            points_to_win: default_points_to_win(),
            win_by_two: false,
            cap: Cap::default(),
        }
    }
}

impl RulesConfig {
    /// Check structural invariants: best_of odd and positive, points_to_win positive,
    /// cap points present and ≥ points_to_win whenever a cap mode is set.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.best_of == 0 || self.best_of % 2 == 0 {
            return Err(MatchError::InvalidRules(
                "best_of must be an odd positive number".into(),
            ));
        }
        if self.points_to_win == 0 {
            return Err(MatchError::InvalidRules(
                "points_to_win must be positive".into(),
            ));
        }
        if self.cap.mode != CapMode::None {
            match self.cap.points {
                Some(p) if p >= self.points_to_win => {}
                Some(_) => {
                    return Err(MatchError::InvalidRules(
                        "cap points must be at least points_to_win".into(),
                    ))
                }
                None => {
                    return Err(MatchError::InvalidRules(
                        "cap points required when a cap mode is set".into(),
                    ))
                }
            }
        }
        Ok(())
    }
}

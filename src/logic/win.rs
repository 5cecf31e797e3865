//! Game win detection and games-needed arithmetic.

use crate::models::{GameScore, RulesConfig, Side};

/// Whether a game score is a win under the ruleset.
///
/// Below `points_to_win` nothing is a win; at or above it the margin must be
/// two with `win_by_two`, otherwise one. The cap never participates here.
pub fn is_game_win(a: u32, b: u32, rules: &RulesConfig) -> bool {
    let max = a.max(b);
    let min = a.min(b);
    if max < rules.points_to_win {
        return false;
    }
    let margin = max - min;
    if rules.win_by_two {
        margin >= 2
    } else {
        margin >= 1
    }
}

/// The side that won a game, if its score satisfies the win condition.
pub fn game_winner(score: &GameScore, rules: &RulesConfig) -> Option<Side> {
    if !is_game_win(score.a, score.b, rules) {
        return None;
    }
    if score.a > score.b {
        Some(Side::A)
    } else {
        Some(Side::B)
    }
}

/// Games a side must win to take a best-of-N match: floor(N/2) + 1.
pub fn required_game_wins(best_of: u32) -> u32 {
    best_of / 2 + 1
}

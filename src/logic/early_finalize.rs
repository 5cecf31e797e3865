//! Minimal valid terminal score for administrative early closure of a game.

use crate::models::{RulesConfig, Side};

/// Reconstruct the smallest score that makes `winner` win from the current
/// points, without lowering the winner below what is already on the board.
///
/// With `gap` = 2 under win-by-two (else 1) and winner A:
/// `base = max(points_to_win, cur_a, cur_b + gap)`, result
/// `(base, min(cur_b, base - gap))`. Winner B is symmetric. The loser-side
/// `min` clamp is kept exactly as the scoring desks apply it.
pub fn minimal_winning_score(
    cur_a: u32,
    cur_b: u32,
    rules: &RulesConfig,
    winner: Side,
) -> (u32, u32) {
    let gap: u32 = if rules.win_by_two { 2 } else { 1 };
    match winner {
        Side::A => {
            let base = rules.points_to_win.max(cur_a).max(cur_b.saturating_add(gap));
            (base, cur_b.min(base.saturating_sub(gap)))
        }
        Side::B => {
            let base = rules.points_to_win.max(cur_b).max(cur_a.saturating_add(gap));
            (cur_a.min(base.saturating_sub(gap)), base)
        }
    }
}

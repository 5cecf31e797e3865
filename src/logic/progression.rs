//! Match progression: point entry, game transitions, and match completion.

use crate::logic::early_finalize::minimal_winning_score;
use crate::logic::win::{game_winner, is_game_win, required_game_wins};
use crate::models::{GameScore, MatchError, MatchRecord, MatchStatus, Side};

/// Transition scheduled → live. Transitions are monotonic; anything else is refused.
pub fn start_match(m: &mut MatchRecord) -> Result<(), MatchError> {
    if m.status != MatchStatus::Scheduled {
        return Err(MatchError::InvalidState);
    }
    m.status = MatchStatus::Live;
    Ok(())
}

/// Apply a signed point delta to the current game, clamped at zero.
///
/// Scores may exceed `points_to_win`; any cap is applied by the authoritative
/// service and only mirrored here. Forbidden once the match is finished.
pub fn increment_point(m: &mut MatchRecord, side: Side, delta: i32) -> Result<(), MatchError> {
    if m.status == MatchStatus::Finished {
        return Err(MatchError::MatchFinished);
    }
    let score = m.current_game_mut().side_score_mut(side);
    *score = score.saturating_add_signed(delta);
    Ok(())
}

/// Set a recorded game's score directly (referee correction).
pub fn set_game_score(
    m: &mut MatchRecord,
    game_index: usize,
    a: u32,
    b: u32,
) -> Result<(), MatchError> {
    if m.status == MatchStatus::Finished {
        return Err(MatchError::MatchFinished);
    }
    let len = m.games.len();
    let game = m
        .games
        .get_mut(game_index)
        .ok_or(MatchError::GameOutOfRange {
            index: game_index,
            len,
        })?;
    game.a = a;
    game.b = b;
    Ok(())
}

/// Open the next game (new zero score).
///
/// Without `auto_next`, the current game must already satisfy the win
/// condition; otherwise this fails with `GameIncomplete`, a recoverable
/// conflict. With `auto_next` the authoritative service decides, so the
/// local gate is skipped.
pub fn start_next_game(m: &mut MatchRecord, auto_next: bool) -> Result<(), MatchError> {
    if m.status == MatchStatus::Finished {
        return Err(MatchError::MatchFinished);
    }
    let current = m.current_game();
    if !auto_next && !is_game_win(current.a, current.b, &m.rules) {
        return Err(MatchError::GameIncomplete);
    }
    m.games.push(GameScore::default());
    Ok(())
}

/// Administratively close the current game before its natural win condition.
///
/// With `keep_current_score` the board score is recorded verbatim, with no
/// win-condition check: referee authority overrides reconstruction. That path
/// still refuses a tie. Otherwise the minimal winning score is reconstructed;
/// when no winner is supplied it is inferred from the leading side, and a tie
/// requires an explicit winner (`TieBreakRequired`).
///
/// Returns the recorded score. The caller then opens the next game or
/// finalizes the match.
pub fn early_finalize_game(
    m: &mut MatchRecord,
    winner: Option<Side>,
    keep_current_score: bool,
) -> Result<GameScore, MatchError> {
    if m.status == MatchStatus::Finished {
        return Err(MatchError::MatchFinished);
    }
    let current = *m.current_game();

    if keep_current_score {
        if current.a == current.b {
            return Err(MatchError::TieBreakRequired);
        }
        return Ok(current);
    }

    let winner = match winner {
        Some(side) => side,
        None if current.a > current.b => Side::A,
        None if current.b > current.a => Side::B,
        None => return Err(MatchError::TieBreakRequired),
    };

    let (a, b) = minimal_winning_score(current.a, current.b, &m.rules, winner);
    let game = m.current_game_mut();
    game.a = a;
    game.b = b;
    Ok(*game)
}

/// Games won so far by a side, counting only games that satisfy the win condition.
pub fn games_won(m: &MatchRecord, side: Side) -> u32 {
    m.games
        .iter()
        .filter(|g| game_winner(g, &m.rules) == Some(side))
        .count() as u32
}

/// Tally game wins and close the match (live → finished).
///
/// Unequal tallies decide the winner; a tied or empty tally preserves any
/// explicit winner override already set.
pub fn finalize_match(m: &mut MatchRecord) -> Result<(), MatchError> {
    if m.status != MatchStatus::Live {
        return Err(MatchError::InvalidState);
    }
    let a_wins = games_won(m, Side::A);
    let b_wins = games_won(m, Side::B);
    if a_wins > b_wins {
        m.winner = Some(Side::A);
    } else if b_wins > a_wins {
        m.winner = Some(Side::B);
    }
    m.status = MatchStatus::Finished;
    Ok(())
}

/// Whether either side has reached the games needed for the match.
///
/// A soft gate for point-entry UIs; nothing in the engine enforces it.
pub fn match_point_reached(m: &MatchRecord) -> bool {
    let needed = required_game_wins(m.rules.best_of);
    games_won(m, Side::A) == needed || games_won(m, Side::B) == needed
}

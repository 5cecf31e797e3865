//! Match progression tests: point entry, game transitions, early finalize,
//! and match completion.

use racket_score_console::{
    early_finalize_game, finalize_match, games_won, increment_point, match_point_reached,
    set_game_score, start_match, start_next_game, GameScore, MatchError, MatchRecord, MatchStatus,
    RulesConfig, Side,
};

fn live_match() -> MatchRecord {
    let rules = RulesConfig {
        win_by_two: true,
        ..RulesConfig::default()
    };
    let mut m = MatchRecord::new(rules);
    start_match(&mut m).unwrap();
    m
}

fn with_games(scores: &[(u32, u32)]) -> MatchRecord {
    let mut m = live_match();
    m.games = scores.iter().map(|&(a, b)| GameScore::new(a, b)).collect();
    m
}

#[test]
fn status_transitions_are_monotonic() {
    let mut m = MatchRecord::new(RulesConfig::default());
    assert_eq!(m.status, MatchStatus::Scheduled);
    start_match(&mut m).unwrap();
    assert_eq!(m.status, MatchStatus::Live);
    // Starting twice is refused.
    assert_eq!(start_match(&mut m), Err(MatchError::InvalidState));

    m.games = vec![GameScore::new(11, 5), GameScore::new(11, 3)];
    finalize_match(&mut m).unwrap();
    assert_eq!(m.status, MatchStatus::Finished);
    assert_eq!(finalize_match(&mut m), Err(MatchError::InvalidState));
}

#[test]
fn finalize_requires_live() {
    let mut m = MatchRecord::new(RulesConfig::default());
    assert_eq!(finalize_match(&mut m), Err(MatchError::InvalidState));
}

#[test]
fn points_accumulate_and_clamp_at_zero() {
    let mut m = live_match();
    increment_point(&mut m, Side::A, 1).unwrap();
    increment_point(&mut m, Side::A, 1).unwrap();
    increment_point(&mut m, Side::B, 1).unwrap();
    assert_eq!((m.current_game().a, m.current_game().b), (2, 1));

    // Decrement below zero clamps instead of erroring.
    increment_point(&mut m, Side::B, -5).unwrap();
    assert_eq!(m.current_game().b, 0);
}

#[test]
fn points_may_exceed_points_to_win() {
    let mut m = live_match();
    for _ in 0..20 {
        increment_point(&mut m, Side::A, 1).unwrap();
    }
    // No local cap: the authoritative service owns cap enforcement.
    assert_eq!(m.current_game().a, 20);
}

#[test]
fn finished_match_is_immutable() {
    let mut m = with_games(&[(11, 5), (11, 3)]);
    finalize_match(&mut m).unwrap();
    assert_eq!(
        increment_point(&mut m, Side::A, 1),
        Err(MatchError::MatchFinished)
    );
    assert_eq!(
        set_game_score(&mut m, 0, 0, 0),
        Err(MatchError::MatchFinished)
    );
    assert_eq!(
        start_next_game(&mut m, false),
        Err(MatchError::MatchFinished)
    );
}

#[test]
fn next_game_gated_on_current_game_win() {
    let mut m = with_games(&[(10, 9)]);
    assert_eq!(
        start_next_game(&mut m, false),
        Err(MatchError::GameIncomplete)
    );
    assert_eq!(m.games.len(), 1);

    m.games[0] = GameScore::new(11, 9);
    start_next_game(&mut m, false).unwrap();
    assert_eq!(m.games.len(), 2);
    assert_eq!(*m.current_game(), GameScore::default());
}

#[test]
fn next_game_auto_mode_skips_local_gate() {
    let mut m = with_games(&[(3, 2)]);
    // Auto-progress: the authoritative service decides, locally we follow.
    start_next_game(&mut m, true).unwrap();
    assert_eq!(m.games.len(), 2);
}

#[test]
fn early_finalize_reconstructs_minimal_score() {
    let mut m = with_games(&[(8, 5)]);
    let game = early_finalize_game(&mut m, Some(Side::A), false).unwrap();
    assert_eq!((game.a, game.b), (11, 5));
    assert_eq!((m.current_game().a, m.current_game().b), (11, 5));
}

#[test]
fn early_finalize_infers_winner_from_lead() {
    let mut m = with_games(&[(3, 7)]);
    let game = early_finalize_game(&mut m, None, false).unwrap();
    assert_eq!((game.a, game.b), (3, 11));
}

#[test]
fn early_finalize_tie_requires_explicit_winner() {
    let mut m = with_games(&[(5, 5)]);
    assert_eq!(
        early_finalize_game(&mut m, None, false),
        Err(MatchError::TieBreakRequired)
    );
    // Untouched on refusal.
    assert_eq!((m.current_game().a, m.current_game().b), (5, 5));

    let game = early_finalize_game(&mut m, Some(Side::B), false).unwrap();
    assert_eq!((game.a, game.b), (5, 11));
}

#[test]
fn early_finalize_keep_current_records_verbatim() {
    // Referee authority: the board score stands even though 5-3 is no win
    // under the ruleset.
    let mut m = with_games(&[(5, 3)]);
    let game = early_finalize_game(&mut m, None, true).unwrap();
    assert_eq!((game.a, game.b), (5, 3));
    assert_eq!((m.current_game().a, m.current_game().b), (5, 3));
}

#[test]
fn early_finalize_keep_current_refuses_tie() {
    let mut m = with_games(&[(4, 4)]);
    assert_eq!(
        early_finalize_game(&mut m, None, true),
        Err(MatchError::TieBreakRequired)
    );
}

#[test]
fn finalize_tallies_games_and_picks_winner() {
    let mut m = with_games(&[(11, 5), (9, 11), (11, 7)]);
    assert_eq!(games_won(&m, Side::A), 2);
    assert_eq!(games_won(&m, Side::B), 1);
    finalize_match(&mut m).unwrap();
    assert_eq!(m.winner, Some(Side::A));
    assert_eq!(m.status, MatchStatus::Finished);
}

#[test]
fn finalize_ignores_incomplete_games_in_tally() {
    // Second game never reached a win condition: it counts for nobody.
    let mut m = with_games(&[(11, 5), (10, 9), (11, 7)]);
    assert_eq!(games_won(&m, Side::A), 2);
    assert_eq!(games_won(&m, Side::B), 0);
    finalize_match(&mut m).unwrap();
    assert_eq!(m.winner, Some(Side::A));
}

#[test]
fn finalize_preserves_winner_override_on_tied_tally() {
    let mut m = with_games(&[(11, 5), (5, 11)]);
    m.winner = Some(Side::B);
    finalize_match(&mut m).unwrap();
    assert_eq!(m.winner, Some(Side::B));

    // Without an override a tied tally leaves the winner unset.
    let mut m = with_games(&[(11, 5), (5, 11)]);
    finalize_match(&mut m).unwrap();
    assert_eq!(m.winner, None);
}

#[test]
fn match_point_gate() {
    let mut m = with_games(&[(11, 5)]);
    assert!(!match_point_reached(&m));
    m.games.push(GameScore::new(11, 9));
    assert!(match_point_reached(&m));
    // Soft gate only: point entry still works.
    increment_point(&mut m, Side::B, 1).unwrap();
}

#[test]
fn set_game_score_bounds_checked() {
    let mut m = live_match();
    set_game_score(&mut m, 0, 7, 4).unwrap();
    assert_eq!((m.games[0].a, m.games[0].b), (7, 4));
    assert_eq!(
        set_game_score(&mut m, 3, 1, 1),
        Err(MatchError::GameOutOfRange { index: 3, len: 1 })
    );
}

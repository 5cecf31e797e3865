//! Pure scoring and progression logic: win detection, early finalize,
//! serve rotation, and match progression. Synchronous and side-effect-free.

mod early_finalize;
mod progression;
mod serve;
mod win;

pub use early_finalize::minimal_winning_score;
pub use progression::{
    early_finalize_game, finalize_match, games_won, increment_point, match_point_reached,
    set_game_score, start_match, start_next_game,
};
pub use serve::{current_slot, current_slot_of};
pub use win::{game_winner, is_game_win, required_game_wins};

//! Doubles serve rotation: which slot a participant occupies right now.

use crate::models::{GameScore, ParticipantId, Side, SideSlots, Slot};

/// Current slot from a base slot and the side's own score: base when the
/// score is even, flipped when odd. Parity of the participant's own side
/// only; the opponent's score never enters.
pub fn current_slot(base: Slot, side_score: u32) -> Slot {
    if side_score % 2 == 0 {
        base
    } else {
        base.flip()
    }
}

/// Current slot of a participant on `side` in the given game, or None when
/// they have no registered base slot.
pub fn current_slot_of(
    participant: ParticipantId,
    side: Side,
    slots: &SideSlots,
    game: &GameScore,
) -> Option<Slot> {
    let base = slots.base_slot_of(side, participant)?;
    Some(current_slot(base, game.side_score(side)))
}

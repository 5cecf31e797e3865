//! Side, doubles slot, and per-game score.

use serde::{Deserialize, Serialize};

/// One of the two competing parties.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    A,
    B,
}

/// Doubles position within a side. Serialized as 1 or 2 on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    #[default]
    One,
    Two,
}

impl Slot {
    /// The other slot on the same side.
    pub fn flip(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

impl From<Slot> for u8 {
    fn from(s: Slot) -> u8 {
        match s {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(format!("slot must be 1 or 2, got {other}")),
        }
    }
}

/// Score of a single game. Zero-initialized when the game opens.
///
/// `capped` mirrors the authoritative service's cap decision; this layer never
/// sets it on its own.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub a: u32,
    pub b: u32,
    #[serde(default)]
    pub capped: bool,
}

impl GameScore {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            a,
            b,
            capped: false,
        }
    }

    /// Points of the given side in this game.
    pub fn side_score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    pub fn side_score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}

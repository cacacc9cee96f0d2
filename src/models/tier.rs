use serde::{Deserialize, Serialize};

/// Presentation grouping derived from a zero-based rank
///
/// Only used for display; it never influences ordering or filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    A,
    B,
    C,
    D,
}

impl Tier {
    pub fn of(index: usize) -> Self {
        match index {
            0..=2 => Tier::A,
            3..=9 => Tier::B,
            10..=19 => Tier::C,
            _ => Tier::D,
        }
    }
}

/// Shorthand for [`Tier::of`]
pub fn tier_of(index: usize) -> Tier {
    Tier::of(index)
}

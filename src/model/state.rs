use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

/// The epidemic state of a person on a given day.
///
/// Variants are declared in the canonical summary column order
/// (`D`, `H`, `I`, `M`, `S`), so the derived `Ord` and `State::iter()`
/// both follow that order. The engine does not treat any state specially:
/// whether a state is terminal is decided entirely by the transition model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
pub enum State {
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    Deceased,
    #[default]
    #[serde(rename = "H")]
    #[strum(serialize = "H")]
    Healthy,
    #[serde(rename = "I")]
    #[strum(serialize = "I")]
    Infected,
    #[serde(rename = "M")]
    #[strum(serialize = "M")]
    Immune,
    #[serde(rename = "S")]
    #[strum(serialize = "S")]
    Symptomatic,
}

impl State {
    /// Position of this state in the canonical column order.
    pub fn index(self) -> usize {
        self as usize
    }
}

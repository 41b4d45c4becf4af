//! The static data driving the simulation: the state and age group
//! vocabularies and the per-age-group transition model.
mod age_group;
mod state;
mod transition;

pub use age_group::AgeGroup;
pub use state::State;
pub use transition::{TransitionDistribution, TransitionModel};

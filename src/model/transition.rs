use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::TimelineError;
use crate::model::{AgeGroup, State};
use crate::rand::Rng;
use crate::random::sample_categorical;

/// Candidate next states and their (unnormalized) weights.
pub type TransitionDistribution = BTreeMap<State, f64>;

const BUILTIN_MODEL: &str = include_str!("../../data/sim_parameters.json");

/// Per-age-group Markov chain: where a person in a given state may go next,
/// and how many days they stay once they get there.
///
/// Serialized as
/// `{"transitions": {age_group: {state: {next_state: weight}}},
///   "holding_times": {age_group: {state: days}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionModel {
    transitions: BTreeMap<AgeGroup, BTreeMap<State, TransitionDistribution>>,
    holding_times: BTreeMap<AgeGroup, BTreeMap<State, u32>>,
}

impl TransitionModel {
    /// The model shipped with the crate.
    ///
    /// # Errors
    /// Returns an error if the embedded model data fails to parse.
    pub fn builtin() -> Result<Self, TimelineError> {
        Ok(serde_json::from_str(BUILTIN_MODEL)?)
    }

    /// # Errors
    /// Returns an error if the JSON is malformed or does not match the model shape.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TimelineError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// # Errors
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, TimelineError> {
        let path = path.as_ref();
        debug!("loading transition model from {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Sets the distribution of next states for `state` in `age_group`.
    #[must_use]
    pub fn with_transition<I>(mut self, age_group: AgeGroup, state: State, next_states: I) -> Self
    where
        I: IntoIterator<Item = (State, f64)>,
    {
        self.transitions
            .entry(age_group)
            .or_default()
            .insert(state, next_states.into_iter().collect());
        self
    }

    /// Sets how long a person in `age_group` stays in `state` once entered.
    #[must_use]
    pub fn with_holding_time(mut self, age_group: AgeGroup, state: State, days: u32) -> Self {
        self.holding_times
            .entry(age_group)
            .or_default()
            .insert(state, days);
        self
    }

    /// # Errors
    /// Returns `MissingTransition` naming the key if no distribution is defined.
    pub fn distribution(
        &self,
        age_group: AgeGroup,
        state: State,
    ) -> Result<&TransitionDistribution, TimelineError> {
        self.transitions
            .get(&age_group)
            .and_then(|by_state| by_state.get(&state))
            .ok_or(TimelineError::MissingTransition { age_group, state })
    }

    /// # Errors
    /// Returns `MissingHoldingTime` naming the key if no holding time is defined.
    pub fn holding_time(&self, age_group: AgeGroup, state: State) -> Result<u32, TimelineError> {
        self.holding_times
            .get(&age_group)
            .and_then(|by_state| by_state.get(&state))
            .copied()
            .ok_or(TimelineError::MissingHoldingTime { age_group, state })
    }

    /// Draws the state a person in `age_group` moves to when leaving `state`.
    ///
    /// # Errors
    /// Fails if the distribution is missing or its weights are unusable.
    pub fn sample_next_state<R: Rng + ?Sized>(
        &self,
        age_group: AgeGroup,
        state: State,
        rng: &mut R,
    ) -> Result<State, TimelineError> {
        let distribution = self.distribution(age_group, state)?;
        sample_categorical(rng, distribution).map_err(|error| TimelineError::InvalidWeights {
            age_group,
            state,
            reason: error.to_string(),
        })
    }

    /// Checks every state reachable from `Healthy` in every age group: each must
    /// have a usable distribution, and each possible next state a holding time.
    /// States that can never be reached need not be defined.
    ///
    /// # Errors
    /// Returns the first offending `(age_group, state)` found.
    pub fn validate(&self) -> Result<(), TimelineError> {
        for age_group in AgeGroup::iter() {
            let mut seen = BTreeSet::from([State::Healthy]);
            let mut queue = VecDeque::from([State::Healthy]);
            while let Some(state) = queue.pop_front() {
                let distribution = self.distribution(age_group, state)?;
                check_weights(age_group, state, distribution)?;
                for (&next, &weight) in distribution {
                    if weight == 0.0 {
                        continue;
                    }
                    self.holding_time(age_group, next)?;
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_weights(
    age_group: AgeGroup,
    state: State,
    distribution: &TransitionDistribution,
) -> Result<(), TimelineError> {
    let invalid = |reason: &str| TimelineError::InvalidWeights {
        age_group,
        state,
        reason: reason.to_string(),
    };
    if distribution
        .values()
        .any(|weight| !weight.is_finite() || *weight < 0.0)
    {
        return Err(invalid("weights must be finite and non-negative"));
    }
    if distribution.values().all(|weight| *weight == 0.0) {
        return Err(invalid("at least one weight must be positive"));
    }
    Ok(())
}

//! The per-person Markov chain.
//!
//! Each person carries a [`PersonState`] (current state plus remaining holding
//! time) that starts at `Healthy` with nothing left to hold, so a transition
//! always fires on a person's first day. On each later day a transition fires
//! once the remaining holding time has run out:
//!
//! | day | remaining before | action                     | recorded `staying_days` |
//! |-----|------------------|----------------------------|-------------------------|
//! | 1   | 0                | draw next state, hold = N  | N                       |
//! | 2   | N - 1            | stay                       | N - 1                   |
//! | N   | 1                | stay                       | 1                       |
//! | N+1 | 0                | draw next state            | ...                     |
//!
//! People are independent: every person gets their own rng stream derived from
//! the base seed and their person id, and people are simulated in parallel.

use std::collections::BTreeMap;

use log::{debug, trace};
use rayon::prelude::*;

use crate::define_rng;
use crate::error::TimelineError;
use crate::model::{AgeGroup, State, TransitionModel};
use crate::population::{Individual, PersonId};
use crate::rand::Rng;
use crate::random::SeedSource;
use crate::timeline::{DateRange, Timeline, TimelineRow};

define_rng!(TransitionRng);

/// The running state of one person's chain between days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonState {
    pub current_state: State,
    pub holding_time_remaining: i64,
}

impl Default for PersonState {
    fn default() -> Self {
        PersonState {
            current_state: State::Healthy,
            holding_time_remaining: 0,
        }
    }
}

impl PersonState {
    /// Advances the chain by one day and returns the `(state, staying_days)`
    /// to record for that day. The recorded holding time includes the day
    /// itself; the carried value is one less.
    ///
    /// # Errors
    /// Fails if the model has no usable entry for the person's
    /// `(age_group, state)`.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        age_group: AgeGroup,
        model: &TransitionModel,
        rng: &mut R,
    ) -> Result<(State, i64), TimelineError> {
        if self.holding_time_remaining <= 0 {
            let next_state = model.sample_next_state(age_group, self.current_state, rng)?;
            self.current_state = next_state;
            self.holding_time_remaining = i64::from(model.holding_time(age_group, next_state)?);
        }
        let recorded = (self.current_state, self.holding_time_remaining);
        self.holding_time_remaining -= 1;
        Ok(recorded)
    }
}

/// Simulates one person's rows, which must all share a person id and be in
/// date order. Returns new rows with `state` and `staying_days` filled in.
///
/// # Errors
/// Propagates model lookup failures.
pub fn simulate_person_rows<I, R>(
    rows: I,
    model: &TransitionModel,
    rng: &mut R,
) -> Result<Vec<TimelineRow>, TimelineError>
where
    I: IntoIterator<Item = TimelineRow>,
    R: Rng + ?Sized,
{
    let mut person = PersonState::default();
    rows.into_iter()
        .map(|row| {
            let (state, staying_days) = person.step(row.age_group, model, &mut *rng)?;
            Ok(TimelineRow {
                state,
                staying_days,
                ..row
            })
        })
        .collect()
}

/// Groups rows by person id. Each group is sorted by date, so the input only
/// needs to be complete, not ordered or contiguous.
pub fn group_by_person<I>(rows: I) -> BTreeMap<PersonId, Vec<TimelineRow>>
where
    I: IntoIterator<Item = TimelineRow>,
{
    let mut groups: BTreeMap<PersonId, Vec<TimelineRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.person_id).or_default().push(row);
    }
    for rows in groups.values_mut() {
        rows.sort_by_key(|row| row.date);
    }
    groups
}

/// Runs the chain for every person against a shared, read-only model.
#[derive(Debug, Clone, Copy)]
pub struct StateSimulator<'a> {
    model: &'a TransitionModel,
    seeds: SeedSource,
}

impl<'a> StateSimulator<'a> {
    pub fn new(model: &'a TransitionModel, random_seed: u64) -> Self {
        StateSimulator {
            model,
            seeds: SeedSource::new(random_seed),
        }
    }

    /// Simulates one person's date-ordered rows on that person's own rng stream.
    ///
    /// # Errors
    /// Propagates model lookup failures.
    pub fn simulate_person<I>(
        &self,
        person_id: PersonId,
        rows: I,
    ) -> Result<Vec<TimelineRow>, TimelineError>
    where
        I: IntoIterator<Item = TimelineRow>,
    {
        trace!("simulating person {person_id}");
        let mut rng = self.seeds.rng_for(TransitionRng, person_id.0);
        simulate_person_rows(rows, self.model, &mut rng)
    }

    /// Simulates an initialized timeline. Rows are grouped by person first,
    /// and the result is ordered by person id then date.
    ///
    /// # Errors
    /// Fails on the first model lookup failure.
    pub fn simulate<I>(&self, rows: I) -> Result<Timeline, TimelineError>
    where
        I: IntoIterator<Item = TimelineRow>,
    {
        let groups: Vec<(PersonId, Vec<TimelineRow>)> =
            group_by_person(rows).into_iter().collect();
        debug!("simulating {} people", groups.len());
        let per_person = groups
            .into_par_iter()
            .map(|(person_id, rows)| self.simulate_person(person_id, rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Timeline::from_rows(per_person.into_iter().flatten().collect()))
    }

    /// Simulates `population` over `dates` without materializing the
    /// initialized timeline first. Produces the same rows as
    /// `simulate(initialize_timeline(population, dates))`.
    ///
    /// # Errors
    /// Fails on the first model lookup failure.
    pub fn simulate_population(
        &self,
        population: &[Individual],
        dates: DateRange,
    ) -> Result<Timeline, TimelineError> {
        debug!(
            "simulating {} people over {} days",
            population.len(),
            dates.num_days()
        );
        let per_person = population
            .par_iter()
            .map(|individual| {
                let rows = dates
                    .into_iter()
                    .map(|date| TimelineRow::initial(individual, date));
                self.simulate_person(individual.person_id, rows)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Timeline::from_rows(per_person.into_iter().flatten().collect()))
    }
}

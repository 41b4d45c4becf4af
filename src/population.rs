//! Population synthesis: turns demographic ratios into concrete individuals.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::demographics::DemographicTable;
use crate::error::TimelineError;
use crate::model::{AgeGroup, State};

/// Sequential identifier assigned at synthesis time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A simulated person. `state` and `staying_days` are placeholders; the
/// simulated values live on the person's timeline rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Individual {
    pub person_id: PersonId,
    pub country: Arc<str>,
    pub age_group: AgeGroup,
    pub state: State,
    pub staying_days: i64,
}

/// Checks that `sample_ratio` can be used as a downsampling divisor.
///
/// # Errors
/// Returns `InvalidSampleRatio` unless the ratio is finite and positive.
pub fn check_sample_ratio(sample_ratio: f64) -> Result<(), TimelineError> {
    if sample_ratio.is_finite() && sample_ratio > 0.0 {
        Ok(())
    } else {
        Err(TimelineError::InvalidSampleRatio(sample_ratio))
    }
}

/// Number of simulated individuals standing in for `percentage` percent of
/// `population`, downsampled by `sample_ratio` and rounded down.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn group_size(population: u64, percentage: f64, sample_ratio: f64) -> usize {
    let size = population as f64 * (percentage / 100.0) / sample_ratio;
    // Negative or NaN percentages contribute nobody.
    if size.is_nan() || size <= 0.0 {
        0
    } else {
        size.floor() as usize
    }
}

/// Expands the selected countries into individuals. Countries are visited in
/// the given order and age groups in their fixed order; person ids come from a
/// single counter starting at zero.
///
/// # Errors
/// Fails on a non-positive sample ratio or a country missing from `table`.
pub fn synthesize_population<S: AsRef<str>>(
    table: &DemographicTable,
    countries: &[S],
    sample_ratio: f64,
) -> Result<Vec<Individual>, TimelineError> {
    check_sample_ratio(sample_ratio)?;

    let mut population = Vec::new();
    let mut next_id = 0;
    for country in countries {
        let record = table.get(country.as_ref())?;
        let country: Arc<str> = Arc::from(record.country.as_str());
        for age_group in AgeGroup::iter() {
            let size = group_size(record.population, record.percentage(age_group), sample_ratio);
            trace!("{country} {age_group}: {size} individuals");
            population.extend((0..size).map(|offset| Individual {
                person_id: PersonId(next_id + offset as u64),
                country: Arc::clone(&country),
                age_group,
                state: State::Healthy,
                staying_days: 0,
            }));
            next_id += size as u64;
        }
    }
    debug!(
        "synthesized {} individuals from {} countries",
        population.len(),
        countries.len()
    );
    Ok(population)
}

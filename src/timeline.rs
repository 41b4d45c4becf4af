//! Date ranges and the per-person, per-day timeline rows.

use std::iter::Take;
use std::sync::Arc;

use chrono::naive::NaiveDateDaysIterator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::model::{AgeGroup, State};
use crate::population::{Individual, PersonId};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns `InvalidDate` carrying the offending input.
pub fn parse_date(value: &str) -> Result<NaiveDate, TimelineError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| TimelineError::InvalidDate(value.to_string()))
}

/// An inclusive range of calendar days. Always contains at least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns `InvalidDateRange` if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimelineError> {
        if end < start {
            return Err(TimelineError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// # Errors
    /// Fails if either date does not parse or the range is reversed.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimelineError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, counting both ends.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> Take<NaiveDateDaysIterator> {
        self.start.iter_days().take(self.num_days())
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = Take<NaiveDateDaysIterator>;

    fn into_iter(self) -> Self::IntoIter {
        self.days()
    }
}

/// The state of one person on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub person_id: PersonId,
    pub age_group: AgeGroup,
    pub country: Arc<str>,
    pub date: NaiveDate,
    pub state: State,
    pub staying_days: i64,
}

impl TimelineRow {
    /// The unsimulated row for `individual` on `date`.
    pub fn initial(individual: &Individual, date: NaiveDate) -> Self {
        TimelineRow {
            person_id: individual.person_id,
            age_group: individual.age_group,
            country: Arc::clone(&individual.country),
            date,
            state: State::Healthy,
            staying_days: 0,
        }
    }
}

/// Lazily expands every individual across `dates`: one Healthy row per
/// (individual, day), person-major and date-ascending.
pub fn initialize_timeline(
    population: &[Individual],
    dates: DateRange,
) -> impl Iterator<Item = TimelineRow> + '_ {
    population.iter().flat_map(move |individual| {
        dates
            .into_iter()
            .map(move |date| TimelineRow::initial(individual, date))
    })
}

/// A fully simulated timeline, ordered by person then date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    rows: Vec<TimelineRow>,
}

impl Timeline {
    pub fn from_rows(rows: Vec<TimelineRow>) -> Self {
        Timeline { rows }
    }

    pub fn rows(&self) -> &[TimelineRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows belonging to `person_id`, in date order.
    pub fn person(&self, person_id: PersonId) -> impl Iterator<Item = &TimelineRow> {
        self.rows.iter().filter(move |row| row.person_id == person_id)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineRow;
    type IntoIter = std::slice::Iter<'a, TimelineRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

//! Daily per-country state counts.
//!
//! Counting is a reduction over timeline rows: partial [`Summary`] values can
//! be built on separate shards and merged by summation, which is how
//! [`Summary::from_rows_par`] works.

use std::collections::BTreeMap;
use std::ops::AddAssign;
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

use crate::model::State;
use crate::timeline::{Timeline, TimelineRow};

/// One count per state, indexed in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts([u64; State::COUNT]);

impl StateCounts {
    pub fn increment(&mut self, state: State) {
        self.0[state.index()] += 1;
    }

    pub fn get(&self, state: State) -> u64 {
        self.0[state.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (State, u64)> + '_ {
        State::iter().map(|state| (state, self.get(state)))
    }
}

impl AddAssign for StateCounts {
    fn add_assign(&mut self, other: Self) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0) {
            *mine += theirs;
        }
    }
}

/// One output row: a date, a country, and a column per state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub country: Arc<str>,
    #[serde(rename = "D")]
    pub deceased: u64,
    #[serde(rename = "H")]
    pub healthy: u64,
    #[serde(rename = "I")]
    pub infected: u64,
    #[serde(rename = "M")]
    pub immune: u64,
    #[serde(rename = "S")]
    pub symptomatic: u64,
}

impl SummaryRow {
    pub fn new(date: NaiveDate, country: Arc<str>, counts: &StateCounts) -> Self {
        SummaryRow {
            date,
            country,
            deceased: counts.get(State::Deceased),
            healthy: counts.get(State::Healthy),
            infected: counts.get(State::Infected),
            immune: counts.get(State::Immune),
            symptomatic: counts.get(State::Symptomatic),
        }
    }

    pub fn count(&self, state: State) -> u64 {
        match state {
            State::Deceased => self.deceased,
            State::Healthy => self.healthy,
            State::Infected => self.infected,
            State::Immune => self.immune,
            State::Symptomatic => self.symptomatic,
        }
    }

    pub fn total(&self) -> u64 {
        State::iter().map(|state| self.count(state)).sum()
    }
}

/// Counts keyed by (date, country), ordered by date then country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    counts: BTreeMap<(NaiveDate, Arc<str>), StateCounts>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, row: &TimelineRow) {
        self.counts
            .entry((row.date, Arc::clone(&row.country)))
            .or_default()
            .increment(row.state);
    }

    pub fn merge(&mut self, other: Summary) {
        for (key, counts) in other.counts {
            *self.counts.entry(key).or_default() += counts;
        }
    }

    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a TimelineRow>,
    {
        let mut summary = Summary::new();
        for row in rows {
            summary.record(row);
        }
        summary
    }

    /// Parallel map-reduce over `rows`; equal to `from_rows` on the same input.
    pub fn from_rows_par(rows: &[TimelineRow]) -> Self {
        rows.par_iter()
            .fold(Summary::new, |mut summary, row| {
                summary.record(row);
                summary
            })
            .reduce(Summary::new, |mut left, right| {
                left.merge(right);
                left
            })
    }

    pub fn from_timeline(timeline: &Timeline) -> Self {
        Self::from_rows_par(timeline.rows())
    }

    pub fn get(&self, date: NaiveDate, country: &str) -> Option<StateCounts> {
        self.counts.get(&(date, Arc::from(country))).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = SummaryRow> + '_ {
        self.counts
            .iter()
            .map(|((date, country), counts)| SummaryRow::new(*date, Arc::clone(country), counts))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

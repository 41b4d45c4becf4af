use std::fmt::{self, Display};
use std::io;

use chrono::NaiveDate;

use crate::model::{AgeGroup, State};

/// Provides `TimelineError` and maps other errors to
/// convert to a `TimelineError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum TimelineError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    UnknownCountry(String),
    MissingTransition {
        age_group: AgeGroup,
        state: State,
    },
    MissingHoldingTime {
        age_group: AgeGroup,
        state: State,
    },
    InvalidWeights {
        age_group: AgeGroup,
        state: State,
        reason: String,
    },
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    InvalidSampleRatio(f64),
    InvalidDate(String),
    MissingParameter(&'static str),
    ReportError(String),
    TimelineError(String),
}

impl From<io::Error> for TimelineError {
    fn from(error: io::Error) -> Self {
        TimelineError::IoError(error)
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(error: serde_json::Error) -> Self {
        TimelineError::JsonError(error)
    }
}

impl From<csv::Error> for TimelineError {
    fn from(error: csv::Error) -> Self {
        TimelineError::CSVError(error)
    }
}

impl std::error::Error for TimelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimelineError::IoError(error) => Some(error),
            TimelineError::JsonError(error) => Some(error),
            TimelineError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimelineError::IoError(error) => write!(f, "I/O error: {error}"),
            TimelineError::JsonError(error) => write!(f, "JSON error: {error}"),
            TimelineError::CSVError(error) => write!(f, "CSV error: {error}"),
            TimelineError::UnknownCountry(country) => {
                write!(f, "country `{country}` not found in demographic table")
            }
            TimelineError::MissingTransition { age_group, state } => write!(
                f,
                "no transition distribution for age group `{age_group}` in state `{state}`"
            ),
            TimelineError::MissingHoldingTime { age_group, state } => write!(
                f,
                "no holding time for age group `{age_group}` in state `{state}`"
            ),
            TimelineError::InvalidWeights {
                age_group,
                state,
                reason,
            } => write!(
                f,
                "invalid transition weights for age group `{age_group}` in state `{state}`: {reason}"
            ),
            TimelineError::InvalidDateRange { start, end } => {
                write!(f, "end date {end} is before start date {start}")
            }
            TimelineError::InvalidSampleRatio(ratio) => {
                write!(f, "sample ratio must be a positive number, got {ratio}")
            }
            TimelineError::InvalidDate(value) => {
                write!(f, "could not parse `{value}` as a YYYY-MM-DD date")
            }
            TimelineError::MissingParameter(name) => {
                write!(f, "required parameter `{name}` was not provided")
            }
            TimelineError::ReportError(message) => write!(f, "report error: {message}"),
            TimelineError::TimelineError(message) => write!(f, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_offending_key() {
        let error = TimelineError::MissingTransition {
            age_group: AgeGroup::Over65,
            state: State::Symptomatic,
        };
        assert_eq!(
            error.to_string(),
            "no transition distribution for age group `over_65` in state `S`"
        );

        let error = TimelineError::UnknownCountry("Atlantis".to_string());
        assert!(error.to_string().contains("Atlantis"));
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error;
        let error: TimelineError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(error.source().is_some());
    }
}

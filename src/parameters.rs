use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::population::check_sample_ratio;
use crate::timeline::DateRange;

pub const DEFAULT_SAMPLE_RATIO: f64 = 1e6;
pub const DEFAULT_START_DATE: &str = "2021-04-01";
pub const DEFAULT_END_DATE: &str = "2022-04-30";

/// The contents of a JSON parameters file. Every field is optional; values
/// given on the command line take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParametersFile {
    pub countries: Option<Vec<String>>,
    pub sample_ratio: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub random_seed: Option<u64>,
    pub demographics: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl ParametersFile {
    /// # Errors
    /// Fails if the file cannot be read or does not match the expected fields.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, TimelineError> {
        let path = path.as_ref();
        info!("Loading parameters from: {}", path.display());
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }
}

/// Validated run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub countries: Vec<String>,
    pub sample_ratio: f64,
    pub dates: DateRange,
    pub random_seed: u64,
}

impl Parameters {
    /// # Errors
    /// Fails on a non-positive sample ratio or unparseable or reversed dates.
    pub fn new(
        countries: Vec<String>,
        sample_ratio: f64,
        start_date: &str,
        end_date: &str,
        random_seed: u64,
    ) -> Result<Self, TimelineError> {
        check_sample_ratio(sample_ratio)?;
        Ok(Parameters {
            countries,
            sample_ratio,
            dates: DateRange::parse(start_date, end_date)?,
            random_seed,
        })
    }

    /// Checks the sample ratio, which is public and may have changed since construction. The
    /// date range is valid by construction. An empty country selection is allowed.
    ///
    /// # Errors
    /// `InvalidSampleRatio`.
    pub fn validate(&self) -> Result<(), TimelineError> {
        check_sample_ratio(self.sample_ratio)
    }

    /// Builds parameters from a parameters file, falling back to the defaults
    /// for sample ratio, dates and seed.
    ///
    /// # Errors
    /// Same as [`Parameters::new`].
    pub fn from_file(file: &ParametersFile) -> Result<Self, TimelineError> {
        Self::new(
            file.countries.clone().unwrap_or_default(),
            file.sample_ratio.unwrap_or(DEFAULT_SAMPLE_RATIO),
            file.start_date.as_deref().unwrap_or(DEFAULT_START_DATE),
            file.end_date.as_deref().unwrap_or(DEFAULT_END_DATE),
            file.random_seed.unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_when_file_is_empty() {
        let parameters = Parameters::from_file(&ParametersFile::default()).unwrap();
        assert!(parameters.countries.is_empty());
        assert_eq!(parameters.sample_ratio, 1e6);
        assert_eq!(parameters.dates, DateRange::parse("2021-04-01", "2022-04-30").unwrap());
        assert_eq!(parameters.random_seed, 0);
    }

    #[test]
    fn reads_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"countries": ["Testland"], "sample_ratio": 100000, "start_date": "2021-01-01",
                "end_date": "2021-01-03", "random_seed": 9, "demographics": "countries.csv"}}"#
        )
        .unwrap();
        let contents = ParametersFile::from_json_path(file.path()).unwrap();
        assert_eq!(contents.demographics, Some(PathBuf::from("countries.csv")));

        let parameters = Parameters::from_file(&contents).unwrap();
        assert_eq!(parameters.countries, vec!["Testland"]);
        assert_eq!(parameters.sample_ratio, 100_000.0);
        assert_eq!(parameters.dates.num_days(), 3);
        assert_eq!(parameters.random_seed, 9);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"sample_rate": 10}}"#).unwrap();
        assert!(matches!(
            ParametersFile::from_json_path(file.path()),
            Err(TimelineError::JsonError(_))
        ));
    }

    #[test]
    fn validate_allows_empty_selection() {
        let mut parameters = Parameters::from_file(&ParametersFile::default()).unwrap();
        assert!(parameters.validate().is_ok());
        parameters.countries.push("Testland".to_string());
        assert!(parameters.validate().is_ok());
        parameters.sample_ratio = f64::NAN;
        assert!(matches!(
            parameters.validate(),
            Err(TimelineError::InvalidSampleRatio(_))
        ));
    }

    #[test]
    fn validation() {
        assert!(matches!(
            Parameters::new(vec![], 0.0, "2021-01-01", "2021-01-02", 0),
            Err(TimelineError::InvalidSampleRatio(_))
        ));
        assert!(matches!(
            Parameters::new(vec![], 1.0, "2021-01-02", "2021-01-01", 0),
            Err(TimelineError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            Parameters::new(vec![], 1.0, "yesterday", "2021-01-01", 0),
            Err(TimelineError::InvalidDate(_))
        ));
    }
}

//! CSV output for the timeline and summary tables.
//!
//! Each output table implements [`Report`], which fixes its default file name
//! and header row. [`ReportOptions`] decides where files go and whether
//! existing files may be replaced.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use log::{debug, info};
use serde::Serialize;

use crate::error::TimelineError;
use crate::summary::SummaryRow;
use crate::timeline::TimelineRow;

pub trait Report: Serialize {
    /// File name used when no other name is configured.
    fn default_file_name() -> &'static str;
    /// Column names, written even when there are no rows.
    fn headers() -> &'static [&'static str];
}

/// Use this macro to declare a serializable row type as a report.
#[macro_export]
macro_rules! create_report_trait {
    ($name:ty, $file_name:expr, [$($header:expr),+ $(,)?]) => {
        impl $crate::report::Report for $name {
            fn default_file_name() -> &'static str {
                $file_name
            }

            fn headers() -> &'static [&'static str] {
                &[$($header),+]
            }
        }
    };
}

create_report_trait!(
    TimelineRow,
    "a2-covid-simulated-timeseries.csv",
    ["person_id", "age_group", "country", "date", "state", "staying_days"]
);

create_report_trait!(
    SummaryRow,
    "a2-covid-summary-timeseries.csv",
    ["date", "country", "D", "H", "I", "M", "S"]
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            file_prefix: String::new(),
            output_dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a prefix prepended to every report file name.
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut Self {
        self.file_prefix = file_prefix;
        self
    }

    /// Sets the directory reports are written into.
    pub fn directory(&mut self, directory: PathBuf) -> &mut Self {
        self.output_dir = directory;
        self
    }

    /// Allows existing report files to be replaced.
    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    /// Full path of the report file for `T`.
    pub fn path_for<T: Report>(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.file_prefix, T::default_file_name()))
    }

    /// Checks every path in `paths` without writing anything.
    ///
    /// # Errors
    /// Fails on the first path that is not a `.csv` or already exists without `overwrite`.
    pub fn check_available(&self, paths: &[PathBuf]) -> Result<(), TimelineError> {
        paths
            .iter()
            .try_for_each(|path| validate_filepath(path, self.overwrite))
    }
}

fn validate_filepath(path: &Path, overwrite: bool) -> Result<(), TimelineError> {
    if path.extension().and_then(OsStr::to_str) != Some("csv") {
        return Err(TimelineError::ReportError(format!(
            "report output files must be CSVs: {}",
            path.display()
        )));
    }
    if !overwrite && path.exists() {
        return Err(TimelineError::ReportError(format!(
            "file already exists: {}. Please set `overwrite` to true in the file configuration and rerun.",
            path.display()
        )));
    }
    Ok(())
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, TimelineError> {
    validate_filepath(path, overwrite)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Writes `rows` to `path` as CSV with `T`'s header row.
///
/// # Errors
/// Fails if the path is not a `.csv`, already exists without `overwrite`, or
/// cannot be written.
pub fn write_report_to<'a, T, I>(path: &Path, overwrite: bool, rows: I) -> Result<usize, TimelineError>
where
    T: Report + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = generate_validate_filepath(path, overwrite)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer.write_record(T::headers())?;
    let mut written = 0;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush()?;
    debug!("wrote {written} rows to {}", path.display());
    Ok(written)
}

/// Writes `rows` to the file configured for `T` in `options` and returns its path.
///
/// # Errors
/// See [`write_report_to`].
pub fn write_report<'a, T, I>(options: &ReportOptions, rows: I) -> Result<PathBuf, TimelineError>
where
    T: Report + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let path = options.path_for::<T>();
    let written = write_report_to(&path, options.overwrite, rows)?;
    info!("{} rows written to {}", written, path.display());
    Ok(path)
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::sync::Arc;

    use tempfile::tempdir;

    use super::*;
    use crate::model::{AgeGroup, State};
    use crate::population::PersonId;
    use crate::timeline::parse_date;

    fn timeline_rows() -> Vec<TimelineRow> {
        vec![
            TimelineRow {
                person_id: PersonId(0),
                age_group: AgeGroup::Under5,
                country: Arc::from("Testland"),
                date: parse_date("2021-01-01").unwrap(),
                state: State::Infected,
                staying_days: 2,
            },
            TimelineRow {
                person_id: PersonId(0),
                age_group: AgeGroup::Under5,
                country: Arc::from("Testland"),
                date: parse_date("2021-01-02").unwrap(),
                state: State::Infected,
                staying_days: 1,
            },
        ]
    }

    #[test]
    fn timeline_csv_layout() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options.directory(temp_dir.path().to_path_buf());

        let path = write_report(&options, &timeline_rows()).unwrap();
        assert!(path.ends_with("a2-covid-simulated-timeseries.csv"));
        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "person_id,age_group,country,date,state,staying_days\n\
             0,less_5,Testland,2021-01-01,I,2\n\
             0,less_5,Testland,2021-01-02,I,1\n"
        );
    }

    #[test]
    fn summary_round_trips_through_reader() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options
            .directory(temp_dir.path().join("nested").join("dir"))
            .file_prefix("run1_".to_string());

        let row = SummaryRow {
            date: parse_date("2021-01-01").unwrap(),
            country: Arc::from("Testland"),
            deceased: 0,
            healthy: 3,
            infected: 4,
            immune: 0,
            symptomatic: 1,
        };
        let path = write_report(&options, [&row]).unwrap();
        assert!(path.ends_with("run1_a2-covid-summary-timeseries.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            vec!["date", "country", "D", "H", "I", "M", "S"]
        );
        let records: Vec<SummaryRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records, vec![row]);
    }

    #[test]
    fn empty_report_still_has_headers() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("empty.csv");
        let rows: Vec<SummaryRow> = Vec::new();
        assert_eq!(write_report_to(&path, false, &rows).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "date,country,D,H,I,M,S\n"
        );
    }

    #[test]
    fn only_csvs_allowed() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("sample_report.tsv");
        match write_report_to(&path, false, &timeline_rows()) {
            Err(TimelineError::ReportError(message)) => {
                assert!(message.contains("must be CSVs"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn respects_overwrite_flag() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("timeline.csv");
        write_report_to(&path, false, &timeline_rows()).unwrap();

        assert!(matches!(
            write_report_to(&path, false, &timeline_rows()[..1]),
            Err(TimelineError::ReportError(_))
        ));
        // The first write is left untouched.
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);

        write_report_to(&path, true, &timeline_rows()[..1]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn check_available_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options.directory(temp_dir.path().join("out"));
        let timeline = options.path_for::<TimelineRow>();
        let summary = options.path_for::<SummaryRow>();

        options.check_available(&[timeline.clone(), summary.clone()]).unwrap();
        assert!(!temp_dir.path().join("out").exists());

        write_report(&options, &timeline_rows()).unwrap();
        assert!(matches!(
            options.check_available(&[summary.clone(), timeline.clone()]),
            Err(TimelineError::ReportError(_))
        ));
        options.overwrite(true);
        options.check_available(&[summary, timeline]).unwrap();
    }
}

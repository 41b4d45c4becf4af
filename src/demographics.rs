//! The countries table: total population and age-group percentages per country.

use std::io::Read;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::hashing::HashMap;
use crate::model::AgeGroup;

/// One row of the countries CSV. Percentages are percent of the total
/// population and need not sum to exactly 100. Columns other than these are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country: String,
    pub population: u64,
    #[serde(rename = "less_5")]
    pub under_5: f64,
    #[serde(rename = "5_to_14")]
    pub from_5_to_14: f64,
    #[serde(rename = "15_to_24")]
    pub from_15_to_24: f64,
    #[serde(rename = "25_to_64")]
    pub from_25_to_64: f64,
    #[serde(rename = "over_65")]
    pub over_65: f64,
}

impl CountryRecord {
    pub fn percentage(&self, age_group: AgeGroup) -> f64 {
        match age_group {
            AgeGroup::Under5 => self.under_5,
            AgeGroup::From5To14 => self.from_5_to_14,
            AgeGroup::From15To24 => self.from_15_to_24,
            AgeGroup::From25To64 => self.from_25_to_64,
            AgeGroup::Over65 => self.over_65,
        }
    }
}

/// Country records indexed by name. When a country appears more than once the
/// first row is used.
#[derive(Debug, Clone, Default)]
pub struct DemographicTable {
    records: Vec<CountryRecord>,
    index: HashMap<String, usize>,
}

impl DemographicTable {
    pub fn from_records(records: Vec<CountryRecord>) -> Self {
        let mut index = HashMap::default();
        for (position, record) in records.iter().enumerate() {
            if index.contains_key(&record.country) {
                warn!("duplicate demographic row for {}; keeping the first", record.country);
                continue;
            }
            index.insert(record.country.clone(), position);
        }
        DemographicTable { records, index }
    }

    /// # Errors
    /// Returns an error if a row cannot be parsed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TimelineError> {
        let mut reader = csv::Reader::from_reader(reader);
        let records = reader
            .deserialize()
            .collect::<Result<Vec<CountryRecord>, csv::Error>>()?;
        Ok(Self::from_records(records))
    }

    /// # Errors
    /// Returns an error if the file cannot be opened or a row cannot be parsed.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, TimelineError> {
        let path = path.as_ref();
        let table = Self::from_reader(std::fs::File::open(path)?)?;
        debug!(
            "loaded {} countries from {}",
            table.index.len(),
            path.display()
        );
        Ok(table)
    }

    /// # Errors
    /// Returns `UnknownCountry` if the table has no row for `country`.
    pub fn get(&self, country: &str) -> Result<&CountryRecord, TimelineError> {
        self.index
            .get(country)
            .map(|&position| &self.records[position])
            .ok_or_else(|| TimelineError::UnknownCountry(country.to_string()))
    }

    /// Country names in file order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .enumerate()
            .filter(|(position, record)| self.index.get(&record.country) == Some(position))
            .map(|(_, record)| record.country.as_str())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
country,population,less_5,5_to_14,15_to_24,25_to_64,over_65,median_age
Testland,1000000,10,10,10,60,10,40.5
Otherland,250000,5.5,12.25,14,50,18.25,44
Testland,5,1,1,1,1,1,1
";

    #[test]
    fn loads_rows_and_ignores_extra_columns() {
        let table = DemographicTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let other = table.get("Otherland").unwrap();
        assert_eq!(other.population, 250_000);
        assert_eq!(other.percentage(AgeGroup::From5To14), 12.25);
        assert_eq!(other.percentage(AgeGroup::Over65), 18.25);
    }

    #[test]
    fn first_duplicate_wins() {
        let table = DemographicTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.get("Testland").unwrap().population, 1_000_000);
        assert_eq!(
            table.countries().collect::<Vec<_>>(),
            vec!["Testland", "Otherland"]
        );
    }

    #[test]
    fn unknown_country() {
        let table = DemographicTable::from_reader(CSV.as_bytes()).unwrap();
        match table.get("Atlantis") {
            Err(TimelineError::UnknownCountry(name)) => assert_eq!(name, "Atlantis"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn malformed_row_is_an_error() {
        let csv = "country,population,less_5,5_to_14,15_to_24,25_to_64,over_65\nX,lots,1,1,1,1,1\n";
        assert!(matches!(
            DemographicTable::from_reader(csv.as_bytes()),
            Err(TimelineError::CSVError(_))
        ));
    }
}

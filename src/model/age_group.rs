use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

/// The five demographic bands. The serialized names match the percentage
/// columns of the countries CSV.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
pub enum AgeGroup {
    #[serde(rename = "less_5")]
    #[strum(serialize = "less_5")]
    Under5,
    #[serde(rename = "5_to_14")]
    #[strum(serialize = "5_to_14")]
    From5To14,
    #[serde(rename = "15_to_24")]
    #[strum(serialize = "15_to_24")]
    From15To24,
    #[serde(rename = "25_to_64")]
    #[strum(serialize = "25_to_64")]
    From25To64,
    #[serde(rename = "over_65")]
    #[strum(serialize = "over_65")]
    Over65,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn column_names() {
        let names: Vec<String> = AgeGroup::iter().map(|a| a.to_string()).collect();
        assert_eq!(
            names,
            vec!["less_5", "5_to_14", "15_to_24", "25_to_64", "over_65"]
        );
    }
}

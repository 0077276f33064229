/// Sorter configuration

use crate::error::Result;
use crate::sorter::{SortDirection, TieBreak};
use serde::{Deserialize, Serialize};

/// Options a table applies to every sort request.
///
/// Loaded from JSON; every field is optional and falls back to its default.
///
/// ```
/// use tablesorter::{SorterConfig, SortDirection, TieBreak};
///
/// let config = SorterConfig::from_json(r#"{"tie_break": "origin_index"}"#).unwrap();
/// assert_eq!(config.tie_break, TieBreak::OriginIndex);
/// assert_eq!(config.first_direction, SortDirection::Ascending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// Ordering of rows whose sort cells compare equal
    pub tie_break: TieBreak,
    /// Direction used the first time a column is toggled
    pub first_direction: SortDirection,
}

impl Default for SorterConfig {
    fn default() -> Self {
        SorterConfig {
            tie_break: TieBreak::Unstable,
            first_direction: SortDirection::Ascending,
        }
    }
}

impl SorterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

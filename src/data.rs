use crate::error::DashboardError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

/// One reported incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub country: String,
    pub state: String,
    pub date: String,
    pub year: i32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "casualty_count")]
    pub fatalities: u32,
    #[serde(default, deserialize_with = "casualty_count")]
    pub injuries: u32,
    pub weapon: String,
}

/// Blank cells count as zero; fractional counts (e.g. `3.0`) are rounded.
fn casualty_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0).round() as u32)
        .unwrap_or(0))
}

/// The raw incident table, as loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<IncidentRecord>,
}

impl Dataset {
    pub fn new(records: Vec<IncidentRecord>) -> Self {
        Self { records }
    }

    /// Read CSV with a header row. Columns are matched by name, extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DashboardError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: IncidentRecord = result?;
            records.push(record);
        }

        log::debug!("loaded {} incident records", records.len());
        Ok(Self { records })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Create a Dataset from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self, DashboardError> {
        let array = value
            .as_array()
            .ok_or_else(|| DashboardError::JsonShape("input data must be a JSON array of objects".to_string()))?;

        let mut records = Vec::with_capacity(array.len());
        for item in array {
            if !item.is_object() {
                return Err(DashboardError::JsonShape("items in array must be objects".to_string()));
            }
            records.push(IncidentRecord::deserialize(item)?);
        }

        Ok(Self { records })
    }

    /// Sorted distinct country names.
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Column order of the `asteroid` table.
pub const ASTEROID_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "absolute_magnitude_h",
    "estimated_diameter_min_km",
    "estimated_diameter_max_km",
    "is_potentially_hazardous_asteroid",
    "date",
];

/// One flattened near-Earth-object observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidRecord {
    pub id: String,
    pub name: String,
    pub absolute_magnitude_h: f64,
    pub estimated_diameter_min_km: f64,
    pub estimated_diameter_max_km: f64,
    pub is_potentially_hazardous_asteroid: bool,
    pub date: String,
}

/// Rows produced by one transform pass, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsteroidTable {
    rows: Vec<AsteroidRecord>,
    skipped: usize,
}

impl AsteroidTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<AsteroidRecord>) -> Self {
        Self { rows, skipped: 0 }
    }

    pub fn push(&mut self, record: AsteroidRecord) {
        self.rows.push(record);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &ASTEROID_COLUMNS
    }

    pub fn rows(&self) -> &[AsteroidRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AsteroidRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records dropped because a field was missing or mistyped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), ASTEROID_COLUMNS.len())
    }
}

impl<'a> IntoIterator for &'a AsteroidTable {
    type Item = &'a AsteroidRecord;
    type IntoIter = std::slice::Iter<'a, AsteroidRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A well-formed response from the feed endpoint that did not carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
}

impl ApiFailure {
    pub fn message(&self) -> String {
        format!(
            "Error in API requests - got a {} status code.",
            self.status
        )
    }

}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Output of the extract step.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Parsed body of a 200 response.
    Feed(serde_json::Value),
    ApiFailure(ApiFailure),
}

impl FetchResult {
    pub fn feed(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Feed(value) => Some(value),
            Self::ApiFailure(_) => None,
        }
    }

    pub fn element_count(&self) -> Option<u64> {
        self.feed()?.get("element_count")?.as_u64()
    }
}

impl Serialize for FetchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Feed(value) => value.serialize(serializer),
            Self::ApiFailure(failure) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Message", &failure.message())?;
                map.end()
            }
        }
    }
}

/// What the load step does when the sink rejects a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Log at critical severity and report success.
    #[default]
    Swallow,
    /// Propagate the error so the run reports failure.
    Fail,
}

impl FromStr for LoadFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swallow" => Ok(Self::Swallow),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown load failure policy `{}` (expected `swallow` or `fail`)",
                other
            )),
        }
    }
}

impl fmt::Display for LoadFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swallow => f.write_str("swallow"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_written: u64,
    /// Set when a write failure was swallowed.
    pub failure: Option<String>,
}

impl LoadReport {
    pub fn written(rows_written: u64) -> Self {
        Self {
            rows_written,
            failure: None,
        }
    }

    /// `rows_written` counts rows stored before the failure.
    pub fn swallowed(rows_written: u64, message: impl Into<String>) -> Self {
        Self {
            rows_written,
            failure: Some(message.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub start_date: String,
    pub rows: usize,
    pub skipped: usize,
    pub load: LoadReport,
    pub elapsed: Duration,
}

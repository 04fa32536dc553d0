//! Persisted query log entries and the key scheme shared by the query
//! handler (writer) and the exporter (reader).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const QUERY_ID_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One query/response pair as stored in the table and in the export blob.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct LogRecord {
    pub query_id: String,
    pub query: String,
    /// Serialized JSON of the answer returned to the caller.
    pub response: String,
}

impl LogRecord {
    pub fn new(now: DateTime<Utc>, query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query_id: query_id(now),
            query: query.into(),
            response: response.into(),
        }
    }
}

/// Builds the table key for a record written at `now`.
///
/// Keys start with `date_prefix(now.date_naive())`, which is what lets the
/// exporter select a day with a prefix filter.
pub fn query_id(now: DateTime<Utc>) -> String {
    now.format(QUERY_ID_FORMAT).to_string()
}

pub fn date_prefix(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Object key of the export blob for `day`.
pub fn export_key(day: NaiveDate) -> String {
    format!("logs/{}.json", date_prefix(day))
}

pub fn previous_day(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(1)).date_naive()
}

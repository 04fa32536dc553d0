use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::intent::{classify, Intent};
use crate::record::LogRecord;
use crate::store::LogTable;
use crate::upstream::{Joke, JokeApi, WeatherApi, WeatherReport};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

impl QueryRequest {
    pub fn from_body(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Answer body. Unrecognised queries serialize to `{}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QueryResponse {
    Weather(WeatherReport),
    Joke(Joke),
    Empty {},
}

pub struct QueryHandler<W, J, T> {
    weather: W,
    jokes: J,
    table: T,
}

impl<W: WeatherApi, J: JokeApi, T: LogTable> QueryHandler<W, J, T> {
    pub fn new(weather: W, jokes: J, table: T) -> Self {
        Self { weather, jokes, table }
    }

    pub async fn handle(&self, query: &str) -> Result<QueryResponse> {
        self.handle_at(query, Utc::now()).await
    }

    /// Answers `query` and logs exactly one record keyed by `now`.
    pub async fn handle_at(&self, query: &str, now: DateTime<Utc>) -> Result<QueryResponse> {
        let response = match classify(query) {
            Intent::Weather { city } => QueryResponse::Weather(self.weather.current_weather(&city).await?),
            Intent::Joke => QueryResponse::Joke(self.jokes.random_joke().await?),
            Intent::Unknown => QueryResponse::Empty {},
        };

        let record = LogRecord::new(now, query, serde_json::to_string(&response)?);
        self.table.put_record(&record).await?;
        info!(query_id = %record.query_id, "answered query");

        Ok(response)
    }
}

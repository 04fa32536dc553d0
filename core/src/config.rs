use crate::error::ConfigError;

pub const DEFAULT_TABLE_NAME: &str = "ChatbotQueries";
pub const DEFAULT_WEATHER_API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Settings for the query side: upstream APIs and the log table.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub table_name: String,
    pub weather_api_url: String,
    pub weather_api_key: String,
    pub joke_api_url: String,
}

/// Settings for the daily export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub table_name: String,
    pub bucket_name: String,
}

impl QueryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: optional(&lookup, "TABLE_NAME", DEFAULT_TABLE_NAME),
            weather_api_url: optional(&lookup, "WEATHER_API_URL", DEFAULT_WEATHER_API_URL),
            weather_api_key: required(&lookup, "OPENWEATHER_API_KEY")?,
            joke_api_url: required(&lookup, "JOKE_API_URL")?,
        })
    }
}

impl ExportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: optional(&lookup, "TABLE_NAME", DEFAULT_TABLE_NAME),
            bucket_name: required(&lookup, "LOGGING_BUCKET")?,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::Missing(name))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

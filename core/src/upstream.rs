use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::error::{Error, Result};

/// Current conditions for a city. `temperature` is passed through exactly as
/// the upstream reports it (Kelvin for OpenWeather).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: serde_json::Number,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn current_weather(&self, city: &str) -> Result<WeatherReport>;
}

#[async_trait]
pub trait JokeApi: Send + Sync {
    async fn random_joke(&self) -> Result<Joke>;
}

#[derive(Debug, Clone)]
pub struct HttpApis {
    client: reqwest::Client,
    weather_url: Arc<String>,
    weather_api_key: Arc<String>,
    joke_url: Arc<String>,
}

impl HttpApis {
    pub fn new_w_client(client: reqwest::Client, weather_url: String, weather_api_key: String, joke_url: String) -> Self {
        Self {
            client,
            weather_url: Arc::new(weather_url),
            weather_api_key: Arc::new(weather_api_key),
            joke_url: Arc::new(joke_url),
        }
    }

    pub fn new(weather_url: String, weather_api_key: String, joke_url: String) -> Self {
        Self::new_w_client(reqwest::Client::new(), weather_url, weather_api_key, joke_url)
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(
            config.weather_api_url.clone(),
            config.weather_api_key.clone(),
            config.joke_api_url.clone(),
        )
    }
}

#[async_trait]
impl WeatherApi for HttpApis {
    async fn current_weather(&self, city: &str) -> Result<WeatherReport> {
        let res = self.client.get(self.weather_url.as_str())
            .query(&[("q", city), ("appid", self.weather_api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<WeatherRes>()
            .await?;

        let description = res.weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or(Error::MissingField("weather[0].description"))?;

        Ok(WeatherReport {
            city: city.to_string(),
            temperature: res.main.temp,
            description,
        })
    }
}

#[async_trait]
impl JokeApi for HttpApis {
    async fn random_joke(&self) -> Result<Joke> {
        let joke = self.client.get(self.joke_url.as_str())
            .send()
            .await?
            .error_for_status()?
            .json::<Joke>()
            .await?;

        Ok(joke)
    }
}

#[derive(Deserialize, Debug)]
struct WeatherRes {
    main: MainRes,
    weather: Vec<Conditions>,
}

#[derive(Deserialize, Debug)]
struct MainRes {
    temp: serde_json::Number,
}

#[derive(Deserialize, Debug)]
struct Conditions {
    description: String,
}

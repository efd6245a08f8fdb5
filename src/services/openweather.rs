//! OpenWeatherMap client.
//!
//! Covers the three upstream surfaces the API proxies:
//! - Current weather: `GET {base}/weather`
//! - 5 day / 3 hour forecast: `GET {base}/forecast`
//! - Geocoding: `GET {geo}/direct` and `GET {geo}/reverse`
//!
//! Payloads are validated once here, by deserializing into typed structs.
//! Anything downstream works on already-validated values.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::config::AppConfig;
use crate::errors::{AppError, Operation};
use crate::services::location::{Coordinates, Location};

/// Every upstream failure, collapsed into one type at the call site.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("OpenWeatherMap API key is not configured")]
    MissingApiKey,

    #[error("OpenWeatherMap request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OpenWeatherMap returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("OpenWeatherMap response structure error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Log the failure and convert it to the opaque error returned to clients.
    pub fn into_app_error(self, operation: Operation) -> AppError {
        tracing::error!("{}: {}", operation.failure_message(), self);
        let detail = match self {
            UpstreamError::MissingApiKey => Some("Weather API key is not configured".to_string()),
            _ => None,
        };
        AppError::Upstream { operation, detail }
    }
}

// --- OpenWeatherMap JSON response types ---

/// One weather condition descriptor. Only the first entry of the upstream list is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherDescriptor {
    /// Condition group, e.g. "Rain"
    pub main: String,
    /// e.g. "light rain"
    pub description: String,
    /// Icon code, e.g. "10d"
    pub icon: String,
}

fn first_descriptor<'de, D>(deserializer: D) -> Result<WeatherDescriptor, D::Error>
where
    D: Deserializer<'de>,
{
    let list = Vec::<WeatherDescriptor>::deserialize(deserializer)?;
    list.into_iter()
        .next()
        .ok_or_else(|| serde::de::Error::custom("weather descriptor list is empty"))
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWind {
    pub speed: f64,
    pub deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentSys {
    #[serde(default)]
    pub country: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub sunrise: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub sunset: DateTime<Utc>,
}

/// Response of `GET /weather`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherSample {
    pub name: String,
    pub coord: Coord,
    pub main: CurrentMain,
    /// Metres. Omitted by the provider for some stations.
    pub visibility: Option<f64>,
    pub wind: CurrentWind,
    #[serde(rename = "weather", deserialize_with = "first_descriptor")]
    pub condition: WeatherDescriptor,
    pub sys: CurrentSys,
    pub uvi: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastWind {
    pub speed: f64,
}

/// One 3-hour entry of `GET /forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSample {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub dt: DateTime<Utc>,
    pub main: ForecastMain,
    #[serde(rename = "weather", deserialize_with = "first_descriptor")]
    pub condition: WeatherDescriptor,
    pub wind: ForecastWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub coord: Coord,
}

/// Response of `GET /forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastSample>,
    pub city: ForecastCity,
}

/// Client for the OpenWeatherMap data and geocoding APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    geo_url: String,
}

impl OpenWeatherClient {
    pub fn new(config: &AppConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_key: config.openweather_api_key.clone(),
            base_url: config.openweather_base_url.trim_end_matches('/').to_string(),
            geo_url: config.openweather_geo_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions at a coordinate pair (metric units).
    pub async fn current_weather(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentWeatherSample, UpstreamError> {
        let url = format!("{}/weather", self.base_url);
        self.get_json(
            &url,
            &[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }

    /// Fetch up to `count` 3-hour forecast samples (metric units).
    pub async fn forecast(
        &self,
        coords: Coordinates,
        count: u32,
    ) -> Result<ForecastResponse, UpstreamError> {
        let url = format!("{}/forecast", self.base_url);
        self.get_json(
            &url,
            &[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", "metric".to_string()),
                ("cnt", count.to_string()),
            ],
        )
        .await
    }

    /// Ranked candidates for a free-text place name.
    pub async fn geocode_direct(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Location>, UpstreamError> {
        let url = format!("{}/direct", self.geo_url);
        self.get_json(
            &url,
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Candidates nearest to a coordinate pair.
    pub async fn geocode_reverse(
        &self,
        coords: Coordinates,
        limit: u32,
    ) -> Result<Vec<Location>, UpstreamError> {
        let url = format!("{}/reverse", self.geo_url);
        self.get_json(
            &url,
            &[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;

        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("appid", api_key)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Keep logged upstream bodies short.
fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    }
}

//! Weather reshaping service.
//!
//! Turns OpenWeatherMap payloads into the API's response schema:
//! - `format_current_weather`: one current sample → `CurrentWeatherView`
//! - `aggregate_forecast`: 3-hour samples → one `DailyForecast` per UTC day
//!
//! Plus the fetch pipelines used by the routes, including the two-step
//! resolve-then-fetch flow for city-keyed requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use utoipa::ToSchema;

use crate::errors::{AppError, Operation};
use crate::helpers::{day_key, mean, round_to_int, to_iso_millis};
use crate::services::location::{resolve_city, Coordinates};
use crate::services::openweather::{
    Coord, CurrentWeatherSample, ForecastResponse, ForecastSample, OpenWeatherClient,
};

/// The provider's forecast resolution: 8 samples per day.
pub const SAMPLES_PER_DAY: u32 = 8;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LocationSummary {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Air temperature in Celsius, rounded
    pub temperature: i64,
    /// Feels-like temperature in Celsius, rounded
    pub feels_like: i64,
    /// Relative humidity percentage
    pub humidity: i64,
    /// Pressure in hPa
    pub pressure: i64,
    /// Visibility in kilometres. Null when the provider omits it.
    pub visibility: Option<f64>,
    /// UV index (0 when unknown)
    pub uv_index: f64,
    /// Wind speed in metres per second
    pub wind_speed: f64,
    /// Wind direction in degrees
    pub wind_direction: i64,
    pub description: String,
    pub icon: String,
    /// Condition group, e.g. "Clouds"
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SunTimes {
    /// ISO 8601 UTC
    pub sunrise: String,
    /// ISO 8601 UTC
    pub sunset: String,
}

/// Current weather at a location.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentWeatherView {
    pub location: LocationSummary,
    pub current: CurrentConditions,
    pub sun: SunTimes,
    /// When this response was produced (ISO 8601 UTC)
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TemperatureRange {
    pub min: i64,
    pub max: i64,
    pub avg: i64,
}

/// Summary of one calendar day of forecast samples.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Calendar day in UTC, e.g. "Sun Mar 01 2026"
    pub date: String,
    pub temperature: TemperatureRange,
    /// Most frequent condition group of the day
    pub condition: String,
    /// Most frequent description of the day
    pub description: String,
    /// Most frequent icon of the day
    pub icon: String,
    /// Average relative humidity, rounded
    pub humidity: i64,
    /// Average wind speed in m/s, rounded
    pub wind_speed: i64,
}

/// Daily forecast at a location.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastView {
    pub location: LocationSummary,
    pub forecast: Vec<DailyForecast>,
    /// When this response was produced (ISO 8601 UTC)
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Reshaping
// ---------------------------------------------------------------------------

fn location_summary(name: &str, country: &str, coord: Coord) -> LocationSummary {
    LocationSummary {
        name: name.to_string(),
        country: country.to_string(),
        lat: coord.lat,
        lon: coord.lon,
    }
}

/// Map a current-weather sample to the response schema.
pub fn format_current_weather(
    sample: &CurrentWeatherSample,
    now: DateTime<Utc>,
) -> CurrentWeatherView {
    CurrentWeatherView {
        location: location_summary(&sample.name, &sample.sys.country, sample.coord),
        current: CurrentConditions {
            temperature: round_to_int(sample.main.temp),
            feels_like: round_to_int(sample.main.feels_like),
            humidity: round_to_int(sample.main.humidity),
            pressure: round_to_int(sample.main.pressure),
            visibility: sample.visibility.map(|m| m / 1000.0),
            uv_index: sample.uvi.unwrap_or(0.0),
            wind_speed: sample.wind.speed,
            wind_direction: round_to_int(sample.wind.deg),
            description: sample.condition.description.clone(),
            icon: sample.condition.icon.clone(),
            condition: sample.condition.main.clone(),
        },
        sun: SunTimes {
            sunrise: to_iso_millis(sample.sys.sunrise),
            sunset: to_iso_millis(sample.sys.sunset),
        },
        timestamp: to_iso_millis(now),
    }
}

/// Most frequent value, scanning in order.
///
/// The leader only changes on a strictly greater count, so on a tie the
/// value that reached the winning count first is kept.
pub fn most_common<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut leader: Option<(T, usize)> = None;

    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        *count += 1;
        if leader.as_ref().map_or(true, |(_, best)| *count > *best) {
            leader = Some((value, *count));
        }
    }

    leader.map(|(value, _)| value)
}

/// Forecast samples sharing one UTC calendar day.
#[derive(Debug)]
pub struct DayBucket<'a> {
    pub date: String,
    pub samples: Vec<&'a ForecastSample>,
}

/// Group samples by UTC calendar day, in order of each day's first sample.
pub fn group_by_day(samples: &[ForecastSample]) -> Vec<DayBucket<'_>> {
    let mut buckets: Vec<DayBucket<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        let date = day_key(sample.dt);
        match index.get(&date) {
            Some(&i) => buckets[i].samples.push(sample),
            None => {
                index.insert(date.clone(), buckets.len());
                buckets.push(DayBucket {
                    date,
                    samples: vec![sample],
                });
            }
        }
    }

    buckets
}

fn summarize_day(bucket: &DayBucket<'_>) -> DailyForecast {
    let temps: Vec<f64> = bucket.samples.iter().map(|s| s.main.temp).collect();
    let humidity: Vec<f64> = bucket.samples.iter().map(|s| s.main.humidity).collect();
    let wind: Vec<f64> = bucket.samples.iter().map(|s| s.wind.speed).collect();

    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let modal = |field: fn(&ForecastSample) -> &str| -> String {
        most_common(bucket.samples.iter().map(|s| field(s)))
            .map(str::to_string)
            .unwrap_or_default()
    };

    DailyForecast {
        date: bucket.date.clone(),
        temperature: TemperatureRange {
            min: round_to_int(min),
            max: round_to_int(max),
            avg: round_to_int(mean(&temps)),
        },
        condition: modal(|s| s.condition.main.as_str()),
        description: modal(|s| s.condition.description.as_str()),
        icon: modal(|s| s.condition.icon.as_str()),
        humidity: round_to_int(mean(&humidity)),
        wind_speed: round_to_int(mean(&wind)),
    }
}

/// Collapse 3-hour samples into one summary per UTC calendar day.
///
/// Days appear in the order their first sample appears. An empty input
/// yields an empty forecast.
pub fn aggregate_forecast(samples: &[ForecastSample]) -> Vec<DailyForecast> {
    group_by_day(samples).iter().map(summarize_day).collect()
}

/// Map a forecast response to the response schema.
pub fn format_forecast(response: &ForecastResponse, now: DateTime<Utc>) -> ForecastView {
    let city = &response.city;
    ForecastView {
        location: location_summary(&city.name, &city.country, city.coord),
        forecast: aggregate_forecast(&response.list),
        timestamp: to_iso_millis(now),
    }
}

// ---------------------------------------------------------------------------
// Fetch pipelines
// ---------------------------------------------------------------------------

/// Current weather at a coordinate pair.
pub async fn get_current_weather(
    client: &OpenWeatherClient,
    coords: Coordinates,
) -> Result<CurrentWeatherView, AppError> {
    let sample = client
        .current_weather(coords)
        .await
        .map_err(|e| e.into_app_error(Operation::CurrentWeather))?;
    Ok(format_current_weather(&sample, Utc::now()))
}

/// Daily forecast for the next `days` days at a coordinate pair.
pub async fn get_forecast(
    client: &OpenWeatherClient,
    coords: Coordinates,
    days: u32,
) -> Result<ForecastView, AppError> {
    let response = client
        .forecast(coords, days * SAMPLES_PER_DAY)
        .await
        .map_err(|e| e.into_app_error(Operation::Forecast))?;
    Ok(format_forecast(&response, Utc::now()))
}

/// Resolve `city` to its first geocoding match, then fetch current weather there.
pub async fn get_current_weather_for_city(
    client: &OpenWeatherClient,
    city: &str,
) -> Result<CurrentWeatherView, AppError> {
    let resolved = resolve_city(client, city).await?;
    get_current_weather(client, resolved.coordinates()).await
}

/// Resolve `city` to its first geocoding match, then fetch the forecast there.
pub async fn get_forecast_for_city(
    client: &OpenWeatherClient,
    city: &str,
    days: u32,
) -> Result<ForecastView, AppError> {
    let resolved = resolve_city(client, city).await?;
    get_forecast(client, resolved.coordinates(), days).await
}

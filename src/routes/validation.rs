//! Query and path parameter validation.
//!
//! Everything here runs before any upstream call and fails with a 400.

use axum::extract::rejection::{PathRejection, QueryRejection};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::AppError;
use crate::services::location::Coordinates;

/// Maximum city name length, in characters.
const MAX_CITY_NAME_CHARS: usize = 100;
/// Default forecast length in days.
const DEFAULT_FORECAST_DAYS: u32 = 5;
/// The provider's 3-hour forecast covers five days.
const MAX_FORECAST_DAYS: u32 = 5;

/// Latitude/longitude query. Kept as raw strings so that range and parse
/// failures get their specific messages. Handlers take the extractor as a
/// `Result` and map the remaining rejections (repeated keys, malformed
/// encoding) through [`query_rejected`].
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinateQuery {
    /// Latitude in degrees, -90 to 90
    pub lat: Option<String>,
    /// Longitude in degrees, -180 to 180
    pub lon: Option<String>,
}

impl CoordinateQuery {
    pub fn validate(&self) -> Result<Coordinates, AppError> {
        validate_coordinates(self.lat.as_deref(), self.lon.as_deref())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForecastQuery {
    /// Latitude in degrees, -90 to 90
    pub lat: Option<String>,
    /// Longitude in degrees, -180 to 180
    pub lon: Option<String>,
    /// Number of days to forecast (1-5, default 5)
    pub days: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DaysQuery {
    /// Number of days to forecast (1-5, default 5)
    pub days: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// City name to search for
    pub q: Option<String>,
}

/// Enveloped 400 for a query string the extractor could not deserialize.
pub fn query_rejected(error: &'static str) -> impl FnOnce(QueryRejection) -> AppError {
    move |rejection| AppError::bad_request(error, rejection.body_text())
}

/// Enveloped 400 for a `:city` segment the extractor could not decode.
pub fn city_path_rejected(rejection: PathRejection) -> AppError {
    AppError::bad_request("Invalid city name", rejection.body_text())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Validate a latitude/longitude pair. Bounds are inclusive.
pub fn validate_coordinates(
    lat: Option<&str>,
    lon: Option<&str>,
) -> Result<Coordinates, AppError> {
    let (Some(lat), Some(lon)) = (non_blank(lat), non_blank(lon)) else {
        return Err(AppError::bad_request(
            "Latitude and longitude are required",
            "Please provide both lat and lon query parameters",
        ));
    };

    // `f64::from_str` accepts "NaN" and "inf", so finiteness is checked separately.
    let parse = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());
    let (Some(lat), Some(lon)) = (parse(lat), parse(lon)) else {
        return Err(AppError::bad_request(
            "Invalid coordinates",
            "Latitude and longitude must be valid numbers",
        ));
    };

    if !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::bad_request(
            "Invalid latitude",
            "Latitude must be between -90 and 90 degrees",
        ));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::bad_request(
            "Invalid longitude",
            "Longitude must be between -180 and 180 degrees",
        ));
    }

    Ok(Coordinates { lat, lon })
}

/// Validate a city name and return it trimmed.
pub fn validate_city_name(name: Option<&str>) -> Result<&str, AppError> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return Err(AppError::bad_request(
            "City name is required",
            "Please provide a city name",
        ));
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(
            "Invalid city name",
            "City name cannot be empty",
        ));
    }
    if name.chars().count() > MAX_CITY_NAME_CHARS {
        return Err(AppError::bad_request(
            "Invalid city name",
            format!(
                "City name is too long (max {} characters)",
                MAX_CITY_NAME_CHARS
            ),
        ));
    }

    Ok(trimmed)
}

/// Validate the optional `days` parameter.
pub fn validate_days(days: Option<&str>) -> Result<u32, AppError> {
    let Some(raw) = non_blank(days) else {
        return Ok(DEFAULT_FORECAST_DAYS);
    };

    match raw.parse::<u32>() {
        Ok(d) if (1..=MAX_FORECAST_DAYS).contains(&d) => Ok(d),
        _ => Err(AppError::bad_request(
            "Invalid days",
            format!("Days must be an integer between 1 and {}", MAX_FORECAST_DAYS),
        )),
    }
}

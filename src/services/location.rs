//! Location resolution on top of OpenWeatherMap geocoding.
//!
//! Also provides the first step of the city-keyed weather endpoints:
//! `resolve_city` turns a free-text name into a `ResolvedLocation` which the
//! weather service then fetches for.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, Operation};
use crate::services::openweather::OpenWeatherClient;

/// Maximum candidates returned by a name search.
pub const SEARCH_LIMIT: u32 = 5;
/// Reverse geocoding returns only the nearest match.
const REVERSE_LIMIT: u32 = 1;

/// A validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    /// Place name (e.g. "London")
    pub name: String,
    /// ISO 3166 country code
    #[serde(default)]
    pub country: String,
    /// State or region, when the provider knows one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Latitude (WGS84)
    pub lat: f64,
    /// Longitude (WGS84)
    pub lon: f64,
}

/// A city name resolved to its best-ranked location.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location: Location,
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.location.lat,
            lon: self.location.lon,
        }
    }
}

/// Search locations by name, best match first.
pub async fn search_locations(
    client: &OpenWeatherClient,
    name: &str,
) -> Result<Vec<Location>, AppError> {
    let mut locations = client
        .geocode_direct(name, SEARCH_LIMIT)
        .await
        .map_err(|e| e.into_app_error(Operation::Location))?;
    locations.truncate(SEARCH_LIMIT as usize);
    Ok(locations)
}

/// Find the location nearest to a coordinate pair.
pub async fn reverse_geocode(
    client: &OpenWeatherClient,
    coords: Coordinates,
) -> Result<Location, AppError> {
    let locations = client
        .geocode_reverse(coords, REVERSE_LIMIT)
        .await
        .map_err(|e| e.into_app_error(Operation::Location))?;

    locations
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))
}

/// Resolve a city name to its first-ranked location.
pub async fn resolve_city(
    client: &OpenWeatherClient,
    name: &str,
) -> Result<ResolvedLocation, AppError> {
    let locations = client
        .geocode_direct(name, SEARCH_LIMIT)
        .await
        .map_err(|e| e.into_app_error(Operation::Location))?;

    let location = locations
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("City not found".to_string()))?;

    tracing::debug!(
        "Resolved '{}' to {}, {} ({}, {})",
        name,
        location.name,
        location.country,
        location.lat,
        location.lon
    );
    Ok(ResolvedLocation { location })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openweather::tests::test_config;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidates(n: usize) -> serde_json::Value {
        let items: Vec<serde_json::Value> = (0..n)
            .map(|i| {
                serde_json::json!({
                    "name": format!("Springfield {}", i),
                    "lat": 39.0 + i as f64,
                    "lon": -89.0,
                    "country": "US"
                })
            })
            .collect();
        serde_json::Value::Array(items)
    }

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(&test_config(&server.uri(), Some("test_key"))).unwrap()
    }

    #[test]
    fn test_location_omits_absent_state() {
        let location = Location {
            name: "Reykjavik".to_string(),
            country: "IS".to_string(),
            state: None,
            lat: 64.14,
            lon: -21.94,
        };
        let json = serde_json::to_value(&location).unwrap();
        assert!(json.get("state").is_none());
        assert_eq!(json["country"], "IS");
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidates(7)))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let locations = search_locations(&client, "Springfield").await.unwrap();

        assert_eq!(locations.len(), 5);
        assert_eq!(locations[0].name, "Springfield 0");
    }

    #[tokio::test]
    async fn test_search_upstream_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = search_locations(&client, "Springfield").await;

        assert!(matches!(
            result,
            Err(AppError::Upstream {
                operation: Operation::Location,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_reverse_geocode_first_match() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidates(1)))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let location = reverse_geocode(&client, Coordinates { lat: 39.0, lon: -89.0 })
            .await
            .unwrap();

        assert_eq!(location.name, "Springfield 0");
    }

    #[tokio::test]
    async fn test_reverse_geocode_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = reverse_geocode(&client, Coordinates { lat: 0.0, lon: -160.0 }).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Location not found"));
    }

    #[tokio::test]
    async fn test_resolve_city_picks_first() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidates(3)))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let resolved = resolve_city(&client, "Springfield").await.unwrap();

        assert_eq!(
            resolved.coordinates(),
            Coordinates {
                lat: 39.0,
                lon: -89.0
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_city_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = resolve_city(&client, "Atlantis").await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "City not found"));
    }

    #[tokio::test]
    async fn test_resolve_city_upstream_failure_is_location_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = resolve_city(&client, "Springfield").await;

        assert!(matches!(
            result,
            Err(AppError::Upstream {
                operation: Operation::Location,
                ..
            })
        ));
    }
}

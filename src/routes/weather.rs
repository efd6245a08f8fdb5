//! Weather HTTP endpoints.
//!
//! - GET /api/weather/current?lat=..&lon=..
//! - GET /api/weather/forecast?lat=..&lon=..&days=N
//! - GET /api/weather/current/:city
//! - GET /api/weather/forecast/:city?days=N

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::validation::{
    city_path_rejected, query_rejected, validate_city_name, validate_coordinates, validate_days,
    CoordinateQuery, DaysQuery, ForecastQuery,
};
use super::{AppState, Envelope};
use crate::errors::{AppError, ErrorResponse};
use crate::services::weather::{self, CurrentWeatherView, ForecastView};

/// Get current weather at a coordinate pair.
#[utoipa::path(
    get,
    path = "/api/weather/current",
    tag = "Weather",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Current weather, wrapped in the success envelope", body = CurrentWeatherView),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn get_current_weather(
    State(state): State<AppState>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Json<Envelope<CurrentWeatherView>>, AppError> {
    let Query(params) = query.map_err(query_rejected("Invalid coordinates"))?;
    let coords = params.validate()?;
    let view = weather::get_current_weather(&state.weather_client, coords).await?;
    Ok(Envelope::ok(view))
}

/// Get a daily forecast at a coordinate pair.
#[utoipa::path(
    get,
    path = "/api/weather/forecast",
    tag = "Weather",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Daily forecast, wrapped in the success envelope", body = ForecastView),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Result<Json<Envelope<ForecastView>>, AppError> {
    let Query(params) = query.map_err(query_rejected("Invalid query parameters"))?;
    let coords = validate_coordinates(params.lat.as_deref(), params.lon.as_deref())?;
    let days = validate_days(params.days.as_deref())?;
    let view = weather::get_forecast(&state.weather_client, coords, days).await?;
    Ok(Envelope::ok(view))
}

/// Get current weather for a city, using its best geocoding match.
#[utoipa::path(
    get,
    path = "/api/weather/current/{city}",
    tag = "Weather",
    params(
        ("city" = String, Path, description = "City name (max 100 characters)"),
    ),
    responses(
        (status = 200, description = "Current weather, wrapped in the success envelope", body = CurrentWeatherView),
        (status = 400, description = "Invalid city name", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn get_current_weather_by_city(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<CurrentWeatherView>>, AppError> {
    let Path(city) = city.map_err(city_path_rejected)?;
    let city = validate_city_name(Some(city.as_str()))?;
    let view = weather::get_current_weather_for_city(&state.weather_client, city).await?;
    Ok(Envelope::ok(view))
}

/// Get a daily forecast for a city, using its best geocoding match.
#[utoipa::path(
    get,
    path = "/api/weather/forecast/{city}",
    tag = "Weather",
    params(
        ("city" = String, Path, description = "City name (max 100 characters)"),
        DaysQuery,
    ),
    responses(
        (status = 200, description = "Daily forecast, wrapped in the success envelope", body = ForecastView),
        (status = 400, description = "Invalid city name or days", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn get_forecast_by_city(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Json<Envelope<ForecastView>>, AppError> {
    let Path(city) = city.map_err(city_path_rejected)?;
    let Query(params) = query.map_err(query_rejected("Invalid days"))?;
    let city = validate_city_name(Some(city.as_str()))?;
    let days = validate_days(params.days.as_deref())?;
    let view = weather::get_forecast_for_city(&state.weather_client, city, days).await?;
    Ok(Envelope::ok(view))
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{get_json, test_router};
    use crate::services::openweather::tests::{current_weather_json, forecast_json};
    use axum::http::StatusCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_geocoding(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_current_weather_by_coordinates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "-90"))
            .and(query_param("lon", "180"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let router = test_router(&mock_server.uri(), Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current?lat=-90&lon=180").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["current"]["temperature"], 21);
        assert_eq!(body["data"]["current"]["visibility"], 10.0);
        assert_eq!(body["data"]["location"]["name"], "London");
    }

    #[tokio::test]
    async fn test_current_weather_rejects_out_of_range_latitude() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let router = test_router(&mock_server.uri(), Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current?lat=91&lon=0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid latitude");
    }

    #[tokio::test]
    async fn test_current_weather_requires_coordinates() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current?lat=10").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Latitude and longitude are required");
    }

    #[tokio::test]
    async fn test_forecast_default_days() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("cnt", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let router = test_router(&mock_server.uri(), Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/forecast?lat=59.9&lon=10.7").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["location"]["name"], "Oslo");
        assert_eq!(body["data"]["forecast"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["forecast"][0]["date"], "Sun Mar 01 2026");
    }

    #[tokio::test]
    async fn test_forecast_rejects_invalid_days() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let (status, body) =
            get_json(router, "/api/weather/forecast?lat=59.9&lon=10.7&days=9").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid days");
    }

    #[tokio::test]
    async fn test_current_weather_by_city() {
        let mock_server = MockServer::start().await;
        mount_geocoding(
            &mock_server,
            serde_json::json!([{ "name": "London", "lat": 51.5085, "lon": -0.1257, "country": "GB" }]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5085"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let router = test_router(&mock_server.uri(), Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current/London").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["current"]["condition"], "Clear");
    }

    #[tokio::test]
    async fn test_current_weather_unknown_city_is_404() {
        let mock_server = MockServer::start().await;
        mount_geocoding(&mock_server, serde_json::json!([])).await;

        let router = test_router(&mock_server.uri(), Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current/Atlantis").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "City not found");
    }

    #[tokio::test]
    async fn test_forecast_unknown_city_is_404() {
        let mock_server = MockServer::start().await;
        mount_geocoding(&mock_server, serde_json::json!([])).await;

        let router = test_router(&mock_server.uri(), Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/forecast/Atlantis?days=3").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "City not found");
    }

    #[tokio::test]
    async fn test_city_name_too_long() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let uri = format!("/api/weather/current/{}", "a".repeat(101));
        let (status, body) = get_json(router, &uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid city name");
    }

    #[tokio::test]
    async fn test_blank_city_name() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/forecast/%20%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "City name cannot be empty");
    }

    #[tokio::test]
    async fn test_repeated_coordinate_is_enveloped_400() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current?lat=1&lat=2&lon=3").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid coordinates");
        assert!(body["message"].as_str().unwrap().contains("lat"));
    }

    #[tokio::test]
    async fn test_repeated_days_is_enveloped_400() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/forecast/Oslo?days=1&days=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid days");
    }

    #[tokio::test]
    async fn test_non_utf8_city_is_enveloped_400() {
        let router = test_router("http://127.0.0.1:9", Some("test_key"));
        let (status, body) = get_json(router, "/api/weather/current/%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid city name");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_opaque_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&mock_server)
            .await;

        let router = test_router(&mock_server.uri(), Some("wrong_key"));
        let (status, body) = get_json(router, "/api/weather/current?lat=1&lon=2").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to fetch current weather data");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_500() {
        let router = test_router("http://127.0.0.1:9", None);
        let (status, body) = get_json(router, "/api/weather/forecast?lat=1&lon=2").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch forecast data");
        assert_eq!(body["message"], "Weather API key is not configured");
    }
}

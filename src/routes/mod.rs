pub mod health;
pub mod location;
pub mod validation;
pub mod weather;

use axum::http::{header, HeaderName, HeaderValue, StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::errors::ErrorResponse;
use crate::services::openweather::OpenWeatherClient;

/// Shared application state for weather and location endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) weather_client: OpenWeatherClient,
}

/// Success envelope wrapping every data response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// All API routes plus the enveloped 404 fallback.
pub(crate) fn api_router(state: AppState) -> Router {
    let weather_routes = Router::new()
        .route("/api/weather/current", get(weather::get_current_weather))
        .route(
            "/api/weather/current/:city",
            get(weather::get_current_weather_by_city),
        )
        .route("/api/weather/forecast", get(weather::get_forecast))
        .route(
            "/api/weather/forecast/:city",
            get(weather::get_forecast_by_city),
        )
        .with_state(state.clone());

    let location_routes = Router::new()
        .route("/api/location/search", get(location::search_locations))
        .route("/api/location/reverse", get(location::reverse_geocode))
        .with_state(state);

    let router = Router::new()
        .route("/api/health", get(health::health_check))
        .merge(weather_routes)
        .merge(location_routes)
        .fallback(route_not_found);

    with_security_headers(router)
}

/// Hardening headers set on every API response unless a handler already set them.
fn security_headers() -> [(HeaderName, HeaderValue); 8] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("0")),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
    ]
}

fn with_security_headers(router: Router) -> Router {
    security_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(name, value))
        })
}

async fn route_not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Route not found".to_string(),
            message: Some(format!("The route {} does not exist", uri)),
        }),
    )
}

// Weather Proxy API v0.1
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::openweather::OpenWeatherClient;

/// OpenAPI document for the weather proxy.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Proxy API",
        version = "0.1.0",
        description = "Current conditions, daily forecasts and geocoding backed by \
            OpenWeatherMap. Responses are wrapped in a `{success, data}` envelope; \
            errors use `{success: false, error, message}`.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Weather", description = "Current weather and daily forecasts"),
        (name = "Location", description = "Geocoding and reverse geocoding"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::get_current_weather,
        routes::weather::get_forecast,
        routes::weather::get_current_weather_by_city,
        routes::weather::get_forecast_by_city,
        routes::location::search_locations,
        routes::location::reverse_geocode,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            services::weather::CurrentWeatherView,
            services::weather::CurrentConditions,
            services::weather::SunTimes,
            services::weather::LocationSummary,
            services::weather::ForecastView,
            services::weather::DailyForecast,
            services::weather::TemperatureRange,
            services::location::Location,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_proxy_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    if config.openweather_api_key.is_none() {
        tracing::warn!(
            "OPENWEATHERMAP_API_KEY is not set; weather and location requests will fail"
        );
    }

    let app_state = AppState {
        weather_client: OpenWeatherClient::new(&config)?,
    };

    // CORS: browser frontend only, read-only API
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&config.frontend_url)?)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    let app = routes::api_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(errors::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

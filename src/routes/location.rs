//! Location HTTP endpoints.
//!
//! - GET /api/location/search?q=..
//! - GET /api/location/reverse?lat=..&lon=..

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use super::validation::{query_rejected, validate_city_name, CoordinateQuery, SearchQuery};
use super::{AppState, Envelope};
use crate::errors::{AppError, ErrorResponse};
use crate::services::location::{self, Location};

/// Search locations by city name (up to 5 candidates, best first).
#[utoipa::path(
    get,
    path = "/api/location/search",
    tag = "Location",
    params(SearchQuery),
    responses(
        (status = 200, description = "Candidate locations, wrapped in the success envelope", body = Vec<Location>),
        (status = 400, description = "Missing or invalid city name", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn search_locations(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Location>>>, AppError> {
    let Query(params) = query.map_err(query_rejected("Invalid city name"))?;
    let name = validate_city_name(params.q.as_deref())?;
    let locations = location::search_locations(&state.weather_client, name).await?;
    Ok(Envelope::ok(locations))
}

/// Find the location nearest to a coordinate pair.
#[utoipa::path(
    get,
    path = "/api/location/reverse",
    tag = "Location",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Nearest location, wrapped in the success envelope", body = Location),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 404, description = "No location near these coordinates", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn reverse_geocode(
    State(state): State<AppState>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Json<Envelope<Location>>, AppError> {
    let Query(params) = query.map_err(query_rejected("Invalid coordinates"))?;
    let coords = params.validate()?;
    let location = location::reverse_geocode(&state.weather_client, coords).await?;
    Ok(Envelope::ok(location))
}

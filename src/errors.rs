use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Short error summary
    pub error: String,
    /// Optional human-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Upstream operations, each with its fixed client-facing failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CurrentWeather,
    Forecast,
    Location,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::CurrentWeather => "Failed to fetch current weather data",
            Operation::Forecast => "Failed to fetch forecast data",
            Operation::Location => "Failed to fetch location data",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {error}: {message}")]
    BadRequest { error: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any upstream failure. `detail` is only set for conditions the
    /// operator can fix (missing credential); provider errors stay opaque.
    #[error("Upstream error: {}", .operation.failure_message())]
    Upstream {
        operation: Operation,
        detail: Option<String>,
    },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest { error, message } => {
                (StatusCode::BAD_REQUEST, error, Some(message))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Upstream { operation, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                operation.failure_message().to_string(),
                detail,
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong!".to_string(),
                    Some(msg),
                )
            }
        };

        (
            status,
            axum::Json(ErrorResponse {
                success: false,
                error,
                message,
            }),
        )
            .into_response()
    }
}

/// Turn a handler panic into the 500 envelope.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    AppError::InternalError(detail).into_response()
}

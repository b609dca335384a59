//! JSON error responses.

use airnet_core::CoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    /// The snapshot, or the optional file a handler needs, was not loaded
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    TimedOut(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unknown_carrier(carrier: &str) -> Self {
        ApiError::NotFound(format!("Carrier {carrier} has no routes in the loaded data"))
    }

    pub fn no_data() -> Self {
        ApiError::Unavailable("No network data loaded".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            ApiError::NotFound(_) => Some("List known carriers with GET /v1/carriers"),
            ApiError::Unavailable(_) => {
                Some("Check AIRNET_DATA_DIR and the server log for load errors")
            }
            ApiError::TimedOut(_) => Some("Ask for fewer corridors or retry later"),
            _ => None,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            CoreError::InvalidFleet(_)
            | CoreError::InvalidRules(_)
            | CoreError::UnknownEquipment(_) => ApiError::Unprocessable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        let body = match self.hint() {
            Some(hint) => json!({ "error": self.to_string(), "hint": hint }),
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

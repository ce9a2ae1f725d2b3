use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

use crate::flights::FlightError;
use crate::messages::MessageError;
use crate::places::PlacesError;
use crate::weather::openmeteo::WeatherError;

/// Route-level failure taxonomy. Every handler error funnels through
/// this type so the status mapping lives in exactly one place.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Upstream { message: String, details: String },
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Upstream { message, details } => ErrorBody {
                error: message,
                details: Some(details),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

// The conversions below log the full upstream error and hand the caller
// a redacted summary. Internal exception text never reaches a response.

impl From<FlightError> for ApiError {
    fn from(err: FlightError) -> Self {
        match &err {
            FlightError::MissingApiKey => {
                ApiError::Config("AVIATIONSTACK_API_KEY fehlt (Environment Variable).".to_string())
            }
            FlightError::Status(status) => {
                tracing::error!("flight upstream failure: {err}");
                ApiError::Upstream {
                    message: "Flugdaten-Dienst nicht erreichbar".to_string(),
                    details: format!("HTTP {status}"),
                }
            }
            FlightError::Api(_) => {
                tracing::error!("flight upstream failure: {err}");
                ApiError::Upstream {
                    message: "Flugdaten-Dienst nicht erreichbar".to_string(),
                    details: "upstream error response".to_string(),
                }
            }
            FlightError::Request(_) => {
                tracing::error!("flight request failed: {err}");
                ApiError::Upstream {
                    message: "Flugdaten-Dienst nicht erreichbar".to_string(),
                    details: "request failed".to_string(),
                }
            }
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match &err {
            WeatherError::Status(status) => {
                tracing::error!("weather upstream failure: {err}");
                ApiError::Upstream {
                    message: "Wetterdienst nicht erreichbar".to_string(),
                    details: format!("HTTP {status}"),
                }
            }
            WeatherError::Request(_) => {
                tracing::error!("weather request failed: {err}");
                ApiError::Upstream {
                    message: "Wetterdienst nicht erreichbar".to_string(),
                    details: "request failed".to_string(),
                }
            }
        }
    }
}

impl From<PlacesError> for ApiError {
    fn from(err: PlacesError) -> Self {
        match &err {
            PlacesError::MissingApiKey => {
                ApiError::Config("GEOAPIFY_API_KEY fehlt (Environment Variable).".to_string())
            }
            PlacesError::NoResults => {
                ApiError::NotFound("Keine Treffer für diese Stadt gefunden.".to_string())
            }
            PlacesError::Status(status) => {
                tracing::error!("places upstream failure: {err}");
                ApiError::Upstream {
                    message: "Places-Dienst nicht erreichbar".to_string(),
                    details: format!("HTTP {status}"),
                }
            }
            PlacesError::Request(_) => {
                tracing::error!("places request failed: {err}");
                ApiError::Upstream {
                    message: "Places-Dienst nicht erreichbar".to_string(),
                    details: "request failed".to_string(),
                }
            }
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        tracing::error!("message store failure: {err}");
        ApiError::Internal("Nachricht konnte nicht verarbeitet werden".to_string())
    }
}

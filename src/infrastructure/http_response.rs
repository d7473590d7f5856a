// HTTP response utilities for JSON bodies and error payloads
use crate::domain::error::ForecastError;
use axum::{
    Json,
    body::Body,
    extract::multipart::{MultipartError, MultipartRejection},
    http::{HeaderValue, Response, StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

/// Error rendered as `{"error": ..., "details": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub details: String,
}

impl ApiError {
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Malformed request",
            details: details.into(),
        }
    }

    pub fn internal(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
            details: details.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, details = %self.details, "{}", self.error);
        } else {
            tracing::warn!(status = %self.status, details = %self.details, "{}", self.error);
        }
        (
            self.status,
            Json(json!({ "error": self.error, "details": self.details })),
        )
            .into_response()
    }
}

impl From<ForecastError> for ApiError {
    fn from(e: ForecastError) -> Self {
        match &e {
            ForecastError::MalformedInput(_) => Self {
                status: StatusCode::BAD_REQUEST,
                error: "Malformed input",
                details: e.to_string(),
            },
            ForecastError::ForecastFailure { .. } | ForecastError::Timeout { .. } => {
                Self::internal("Forecast failed", e.to_string())
            }
            ForecastError::Serialization(_) => {
                Self::internal("Failed to serialize forecast results", e.to_string())
            }
            ForecastError::Storage(_) => Self::internal("Failed to process the request", e.to_string()),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        Self {
            status: e.status(),
            error: "Malformed request",
            details: e.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self {
            status: e.status(),
            error: "Malformed request",
            details: e.body_text(),
        }
    }
}

/// Serialize `data` up front so encoding failures surface as a JSON error
/// rather than an empty 500.
pub fn json_response<T: Serialize>(status: StatusCode, data: &T) -> Result<Response<Body>, ApiError> {
    let bytes = serde_json::to_vec(data).map_err(ForecastError::Serialization)?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal("Failed to build response", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_is_bad_request() {
        let err = ApiError::from(ForecastError::malformed("missing required column(s): y"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.details.contains("missing required column"));
    }

    #[test]
    fn test_forecast_failure_is_server_error() {
        let err = ApiError::from(ForecastError::Timeout {
            product_id: 3,
            millis: 10,
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error, "Forecast failed");
    }

    #[test]
    fn test_json_response_sets_headers() {
        let response = json_response(StatusCode::OK, &json!({ "ok": true })).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "11");
    }
}

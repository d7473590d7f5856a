// HTTP request handlers
use crate::domain::error::ForecastError;
use crate::infrastructure::http_response::{ApiError, json_response};
use crate::infrastructure::json_mapper::outcome_to_response;
use crate::infrastructure::upload_store::ScopedUpload;
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{
        State,
        multipart::{Multipart, MultipartRejection},
    },
    http::{Response, StatusCode},
};
use bytes::Bytes;
use std::sync::Arc;

const FILE_FIELD: &str = "file";

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Forecast the top products of an uploaded sales CSV
pub async fn forecast_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response<Body>, ApiError> {
    let mut multipart = multipart?;
    let (file_name, contents) = read_csv_field(&mut multipart).await?;
    tracing::info!(file_name = %file_name, bytes = contents.len(), "received file");

    // The temp file goes away on every path: explicitly here, or on drop
    // if the request is cancelled mid-forecast.
    let upload =
        ScopedUpload::persist_in(&state.upload_dir, &contents).map_err(ForecastError::Storage)?;
    let outcome = state.forecast_service.forecast_file(upload.path()).await;
    upload.close();
    let outcome = outcome?;

    json_response(StatusCode::OK, &outcome_to_response(&outcome))
}

/// The `file` field, or failing that the first field carrying a filename.
async fn read_csv_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        if name == FILE_FIELD {
            let data = field.bytes().await?;
            return Ok((file_name.unwrap_or(name), data));
        }
        if fallback.is_none() {
            if let Some(file_name) = file_name {
                fallback = Some((file_name, field.bytes().await?));
            }
        }
    }

    fallback.ok_or_else(|| {
        ApiError::bad_request(format!("expected a multipart field named '{}'", FILE_FIELD))
    })
}

// Application state for HTTP handlers
use crate::application::forecast_service::ForecastService;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub forecast_service: ForecastService,
    /// Where uploads are stored while they are forecast.
    pub upload_dir: PathBuf,
}

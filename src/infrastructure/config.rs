use crate::domain::forecast::{PeakRule, PeakWindow};
use anyhow::ensure;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub forecast: ForecastSettings,
    pub model: ModelSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Directory for temporary upload files. The system temp dir when unset.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
}

impl ServerSettings {
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastSettings {
    pub horizon_days: usize,
    pub min_observations: usize,
    pub leaderboard_size: usize,
    pub peak_days: usize,
    pub peak_window: PeakWindow,
    pub include_full_forecast: bool,
    pub on_forecast_failure: FailurePolicy,
    pub max_concurrency: usize,
    pub entity_timeout_ms: u64,
}

impl ForecastSettings {
    pub fn peak_rule(&self) -> PeakRule {
        PeakRule {
            count: self.peak_days,
            window: self.peak_window,
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            min_observations: 10,
            leaderboard_size: 5,
            peak_days: 1,
            peak_window: PeakWindow::Full,
            include_full_forecast: false,
            on_forecast_failure: FailurePolicy::Abort,
            max_concurrency: 4,
            entity_timeout_ms: 60_000,
        }
    }
}

/// What to do when a single product's forecast fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole request.
    #[default]
    Abort,
    /// Drop the product and report a warning.
    Skip,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelSettings {
    /// Coverage of the uncertainty interval, e.g. 0.8 for 80%.
    pub interval_width: f64,
}

/// Defaults, then `config/forecast.toml` if present, then `FORECAST__*` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/forecast")
}

pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let defaults = ForecastSettings::default();
    let settings = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.max_upload_bytes", 16 * 1024 * 1024)?
        .set_default("forecast.horizon_days", defaults.horizon_days as u64)?
        .set_default("forecast.min_observations", defaults.min_observations as u64)?
        .set_default("forecast.leaderboard_size", defaults.leaderboard_size as u64)?
        .set_default("forecast.peak_days", defaults.peak_days as u64)?
        .set_default("forecast.peak_window", "full")?
        .set_default("forecast.include_full_forecast", defaults.include_full_forecast)?
        .set_default("forecast.on_forecast_failure", "abort")?
        .set_default("forecast.max_concurrency", defaults.max_concurrency as u64)?
        .set_default("forecast.entity_timeout_ms", defaults.entity_timeout_ms)?
        .set_default("model.interval_width", 0.8)?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("FORECAST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> anyhow::Result<()> {
        let f = &self.forecast;
        ensure!(f.horizon_days > 0, "forecast.horizon_days must be at least 1");
        ensure!(f.leaderboard_size > 0, "forecast.leaderboard_size must be at least 1");
        ensure!(f.peak_days > 0, "forecast.peak_days must be at least 1");
        ensure!(f.max_concurrency > 0, "forecast.max_concurrency must be at least 1");
        ensure!(
            self.model.interval_width > 0.0 && self.model.interval_width < 1.0,
            "model.interval_width must be between 0 and 1, got {}",
            self.model.interval_width
        );
        Ok(())
    }
}

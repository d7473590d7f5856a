// Forecast service - Use case for ranking products by projected sales
use crate::application::forecast_model::ForecastModel;
use crate::domain::error::ForecastError;
use crate::domain::forecast::EntityForecastResult;
use crate::domain::leaderboard::{ForecastOutcome, ForecastWarning, Leaderboard};
use crate::domain::sales::EntitySeries;
use crate::infrastructure::config::{FailurePolicy, ForecastSettings};
use crate::infrastructure::csv_loader;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ForecastService {
    model: Arc<dyn ForecastModel>,
    settings: ForecastSettings,
}

impl ForecastService {
    pub fn new(model: Arc<dyn ForecastModel>, settings: ForecastSettings) -> Self {
        Self { model, settings }
    }

    /// Run the whole pipeline over an uploaded CSV file.
    pub async fn forecast_file(&self, path: &Path) -> Result<ForecastOutcome, ForecastError> {
        let path = path.to_path_buf();
        // Parsing a large upload is CPU-bound; keep it off the async workers.
        let series = tokio::task::spawn_blocking(move || csv_loader::load_series_file(&path))
            .await
            .map_err(|e| ForecastError::Storage(std::io::Error::other(format!("Task join error: {e}"))))??;
        self.forecast_series(series).await
    }

    pub async fn forecast_series(
        &self,
        series: Vec<EntitySeries>,
    ) -> Result<ForecastOutcome, ForecastError> {
        let total = series.len();
        let min_observations = self.settings.min_observations;

        let qualifying: Vec<EntitySeries> = series
            .into_iter()
            .filter(|s| {
                let enough = s.has_sufficient_data(min_observations);
                if !enough {
                    tracing::debug!(
                        product_id = s.product_id,
                        observations = s.len(),
                        "skipping product with insufficient data"
                    );
                }
                enough
            })
            .collect();

        tracing::info!(
            products = total,
            qualifying = qualifying.len(),
            horizon = self.settings.horizon_days,
            "forecasting products"
        );

        // `buffered` yields in input order, so ranking ties stay deterministic.
        let mut forecasts = futures::stream::iter(qualifying)
            .map(|s| self.forecast_entity(s))
            .buffered(self.settings.max_concurrency.max(1));

        let mut results = Vec::new();
        let mut warnings = Vec::new();
        while let Some(outcome) = forecasts.next().await {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => match self.settings.on_forecast_failure {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Skip => {
                        tracing::warn!(error = %e, "skipping product after forecast failure");
                        warnings.push(ForecastWarning {
                            product_id: e.product_id().unwrap_or_default(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        let leaderboard = Leaderboard::rank(results, self.settings.leaderboard_size);
        tracing::info!(
            ranked = leaderboard.len(),
            skipped = warnings.len(),
            "forecast complete"
        );

        Ok(ForecastOutcome::new(leaderboard, warnings))
    }

    async fn forecast_entity(
        &self,
        series: EntitySeries,
    ) -> Result<EntityForecastResult, ForecastError> {
        let product_id = series.product_id;
        let horizon = self.settings.horizon_days;
        let millis = self.settings.entity_timeout_ms;

        let points = tokio::time::timeout(
            Duration::from_millis(millis),
            self.model.forecast(&series, horizon),
        )
        .await
        .map_err(|_| ForecastError::Timeout { product_id, millis })?
        .map_err(|e| ForecastError::ForecastFailure {
            product_id,
            reason: e.to_string(),
        })?;

        EntityForecastResult::from_forecast(
            product_id,
            points,
            horizon,
            self.settings.peak_rule(),
            self.settings.include_full_forecast,
        )
    }
}

// Forecasting capability trait - the seam to whatever fits the models
use crate::domain::error::ModelError;
use crate::domain::forecast::ForecastPoint;
use crate::domain::sales::EntitySeries;
use async_trait::async_trait;

#[async_trait]
pub trait ForecastModel: Send + Sync {
    /// Fit the series and project `horizon` days past its last date.
    ///
    /// Returns one point per distinct historical date followed by exactly
    /// `horizon` future points, all in date order.
    async fn forecast(
        &self,
        series: &EntitySeries,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ModelError>;
}

// Forecast domain models - projections and per-product results
use super::error::ForecastError;
use super::sales::ProductId;
use chrono::NaiveDate;
use serde::Deserialize;

/// A single model output: predicted value and its uncertainty interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    pub fn new(ds: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            ds,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }
}

/// Which part of the returned forecast is searched for peak days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakWindow {
    /// Historical fit and future horizon together.
    #[default]
    Full,
    /// Future horizon only.
    Horizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakRule {
    pub count: usize,
    pub window: PeakWindow,
}

#[derive(Debug, Clone)]
pub struct EntityForecastResult {
    pub product_id: ProductId,
    pub forecast_sum: f64,
    /// Highest predicted points, descending by value.
    pub peaks: Vec<ForecastPoint>,
    pub full_forecast: Option<Vec<ForecastPoint>>,
}

impl EntityForecastResult {
    /// Summarize a model output whose last `horizon` points are the future.
    pub fn from_forecast(
        product_id: ProductId,
        points: Vec<ForecastPoint>,
        horizon: usize,
        peak_rule: PeakRule,
        keep_full_forecast: bool,
    ) -> Result<Self, ForecastError> {
        if points.len() < horizon {
            return Err(ForecastError::ForecastFailure {
                product_id,
                reason: format!(
                    "model returned {} points for a {}-day horizon",
                    points.len(),
                    horizon
                ),
            });
        }

        let future = &points[points.len() - horizon..];
        let forecast_sum = future.iter().map(|p| p.yhat).sum();

        let window = match peak_rule.window {
            PeakWindow::Full => &points[..],
            PeakWindow::Horizon => future,
        };
        let peaks = top_points(window, peak_rule.count);

        Ok(Self {
            product_id,
            forecast_sum,
            peaks,
            full_forecast: keep_full_forecast.then_some(points),
        })
    }

    pub fn peak(&self) -> Option<&ForecastPoint> {
        self.peaks.first()
    }
}

/// Top `count` points by `yhat`; equal values keep the earlier date first.
fn top_points(points: &[ForecastPoint], count: usize) -> Vec<ForecastPoint> {
    let mut ranked: Vec<&ForecastPoint> = points.iter().collect();
    ranked.sort_by(|a, b| b.yhat.total_cmp(&a.yhat));
    ranked.into_iter().take(count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<ForecastPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                ForecastPoint::new(start + chrono::Days::new(i as u64), v, v - 1.0, v + 1.0)
            })
            .collect()
    }

    const SINGLE: PeakRule = PeakRule {
        count: 1,
        window: PeakWindow::Full,
    };

    #[test]
    fn test_forecast_sum_covers_only_horizon() {
        // Historical values are large so any leakage would show up.
        let points = series(&[100.0, 100.0, 100.0, 1.0, 2.0, 3.0]);
        let result = EntityForecastResult::from_forecast(1, points, 3, SINGLE, false).unwrap();

        assert!((result.forecast_sum - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_peak_over_full_window() {
        let points = series(&[5.0, 9.0, 1.0, 2.0]);
        let result = EntityForecastResult::from_forecast(1, points, 2, SINGLE, false).unwrap();

        let peak = result.peak().unwrap();
        assert_eq!(peak.ds, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(peak.yhat, 9.0);
        assert!(result.full_forecast.is_none());
    }

    #[test]
    fn test_top_three_peaks_descending() {
        let points = series(&[5.0, 9.0, 1.0, 7.0, 8.0]);
        let rule = PeakRule {
            count: 3,
            window: PeakWindow::Full,
        };
        let result = EntityForecastResult::from_forecast(1, points, 2, rule, true).unwrap();

        let values: Vec<f64> = result.peaks.iter().map(|p| p.yhat).collect();
        assert_eq!(values, vec![9.0, 8.0, 7.0]);
        assert_eq!(result.full_forecast.as_ref().map(Vec::len), Some(5));
    }

    #[test]
    fn test_peak_ties_prefer_earlier_date() {
        let points = series(&[4.0, 4.0, 4.0]);
        let result = EntityForecastResult::from_forecast(1, points, 1, SINGLE, false).unwrap();

        assert_eq!(
            result.peak().unwrap().ds,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_horizon_peak_window_ignores_history() {
        let points = series(&[50.0, 1.0, 3.0, 2.0]);
        let rule = PeakRule {
            count: 1,
            window: PeakWindow::Horizon,
        };
        let result = EntityForecastResult::from_forecast(1, points, 3, rule, false).unwrap();

        assert_eq!(result.peak().unwrap().yhat, 3.0);
    }

    #[test]
    fn test_short_model_output_is_failure() {
        let points = series(&[1.0, 2.0]);
        let err = EntityForecastResult::from_forecast(4, points, 30, SINGLE, false).unwrap_err();

        assert!(matches!(
            err,
            ForecastError::ForecastFailure { product_id: 4, .. }
        ));
    }
}

//! Additive trend + weekly seasonality forecasting model.
//!
//! Fits `y(t) = intercept + slope * t + weekly[weekday(t)]` where `t` is
//! the day offset from the first observation. Weekly effects are enabled
//! once the history spans two weeks. Uncertainty intervals come from the
//! spread of in-sample residuals and widen with `sqrt(k)` for the k-th
//! future day.

use crate::application::forecast_model::ForecastModel;
use crate::domain::error::ModelError;
use crate::domain::forecast::ForecastPoint;
use crate::domain::sales::EntitySeries;
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeSet;

const MIN_FIT_POINTS: usize = 2;
const WEEKLY_MIN_SPAN_DAYS: i64 = 14;

#[derive(Debug, Clone)]
pub struct AdditiveTrendModel {
    interval_width: f64,
}

impl AdditiveTrendModel {
    pub fn new(interval_width: f64) -> Self {
        Self { interval_width }
    }
}

#[async_trait]
impl ForecastModel for AdditiveTrendModel {
    async fn forecast(
        &self,
        series: &EntitySeries,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ModelError> {
        let points = series.points();
        let interval_width = self.interval_width;

        // Fitting is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || fit_and_project(&points, horizon, interval_width))
            .await
            .map_err(|e| ModelError::Internal(format!("Task join error: {e}")))?
    }
}

/// Fit the model and return the in-sample fit for every distinct observed
/// date followed by `horizon` daily projections.
pub fn fit_and_project(
    points: &[(NaiveDate, f64)],
    horizon: usize,
    interval_width: f64,
) -> Result<Vec<ForecastPoint>, ModelError> {
    if points.len() < MIN_FIT_POINTS {
        return Err(ModelError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: points.len(),
        });
    }
    if points.iter().any(|(_, y)| !y.is_finite()) {
        return Err(ModelError::NumericalError(
            "series contains non-finite values".to_string(),
        ));
    }

    let dates: BTreeSet<NaiveDate> = points.iter().map(|(d, _)| *d).collect();
    let (Some(&origin), Some(&last)) = (dates.first(), dates.last()) else {
        return Err(ModelError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: 0,
        });
    };

    let offset = |d: NaiveDate| (d - origin).num_days() as f64;

    let trend = Trend::fit(points.iter().map(|&(d, y)| (offset(d), y)));
    let weekly = if (last - origin).num_days() >= WEEKLY_MIN_SPAN_DAYS {
        WeeklyEffects::fit(points.iter().map(|&(d, y)| (d, y - trend.at(offset(d)))))
    } else {
        WeeklyEffects::default()
    };

    let predict = |d: NaiveDate| trend.at(offset(d)) + weekly.at(d);

    let sum_sq: f64 = points
        .iter()
        .map(|&(d, y)| (y - predict(d)).powi(2))
        .sum();
    let sigma = (sum_sq / points.len() as f64).sqrt();
    let z = z_score(interval_width)?;
    if !sigma.is_finite() {
        return Err(ModelError::NumericalError(
            "residual spread is not finite".to_string(),
        ));
    }

    let mut forecast = Vec::with_capacity(dates.len() + horizon);
    for &d in &dates {
        let yhat = predict(d);
        let half = z * sigma;
        forecast.push(ForecastPoint::new(d, yhat, yhat - half, yhat + half));
    }
    for k in 1..=horizon {
        let d = last
            .checked_add_days(Days::new(k as u64))
            .ok_or_else(|| ModelError::Internal("forecast date out of range".to_string()))?;
        let yhat = predict(d);
        let half = z * sigma * (k as f64).sqrt();
        forecast.push(ForecastPoint::new(d, yhat, yhat - half, yhat + half));
    }

    Ok(forecast)
}

/// Two-sided standard normal quantile for the given coverage.
fn z_score(interval_width: f64) -> Result<f64, ModelError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ModelError::Internal(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + interval_width / 2.0))
}

/// Ordinary least squares line over (t, y).
#[derive(Debug, Clone, Copy)]
struct Trend {
    intercept: f64,
    slope: f64,
}

impl Trend {
    fn fit(samples: impl Iterator<Item = (f64, f64)> + Clone) -> Self {
        let n = samples.clone().count() as f64;
        let mean_t = samples.clone().map(|(t, _)| t).sum::<f64>() / n;
        let mean_y = samples.clone().map(|(_, y)| y).sum::<f64>() / n;

        let (sxx, sxy) = samples.fold((0.0, 0.0), |(sxx, sxy), (t, y)| {
            let dt = t - mean_t;
            (sxx + dt * dt, sxy + dt * (y - mean_y))
        });

        // All observations on one day: flat line at the mean.
        let slope = if sxx.abs() < 1e-10 { 0.0 } else { sxy / sxx };
        Self {
            intercept: mean_y - slope * mean_t,
            slope,
        }
    }

    fn at(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }
}

/// Mean detrended value per weekday, centered on zero.
#[derive(Debug, Clone, Default)]
struct WeeklyEffects {
    effects: [f64; 7],
}

impl WeeklyEffects {
    fn fit(residuals: impl Iterator<Item = (NaiveDate, f64)>) -> Self {
        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for (d, r) in residuals {
            let idx = d.weekday().num_days_from_monday() as usize;
            sums[idx] += r;
            counts[idx] += 1;
        }

        let observed: Vec<usize> = (0..7).filter(|&i| counts[i] > 0).collect();
        if observed.is_empty() {
            return Self::default();
        }

        let means: Vec<f64> = observed
            .iter()
            .map(|&i| sums[i] / counts[i] as f64)
            .collect();
        let center = means.iter().sum::<f64>() / means.len() as f64;

        let mut effects = [0.0; 7];
        for (&i, mean) in observed.iter().zip(means) {
            effects[i] = mean - center;
        }
        Self { effects }
    }

    fn at(&self, d: NaiveDate) -> f64 {
        self.effects[d.weekday().num_days_from_monday() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sales::Observation;

    fn start() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn daily(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start() + Days::new(i as u64), v))
            .collect()
    }

    #[test]
    fn test_output_covers_history_and_horizon() {
        let points = daily(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let forecast = fit_and_project(&points, 30, 0.8).unwrap();

        assert_eq!(forecast.len(), 40);
        assert_eq!(forecast[9].ds, start() + Days::new(9));
        assert_eq!(forecast[10].ds, start() + Days::new(10));
        assert_eq!(forecast[39].ds, start() + Days::new(39));
    }

    #[test]
    fn test_linear_series_extrapolates() {
        let values: Vec<f64> = (0..10).map(|i| 10.0 + 2.0 * i as f64).collect();
        let forecast = fit_and_project(&daily(&values), 3, 0.8).unwrap();

        let future: Vec<f64> = forecast[10..].iter().map(|p| p.yhat).collect();
        for (got, want) in future.iter().zip([30.0, 32.0, 34.0]) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_weekly_pattern_is_projected() {
        // Flat level with a weekend spike over four weeks.
        let values: Vec<f64> = (0..28)
            .map(|i| if i % 7 >= 5 { 20.0 } else { 10.0 })
            .collect();
        let forecast = fit_and_project(&daily(&values), 7, 0.8).unwrap();

        let future = &forecast[28..];
        // Day 28 is a Monday, days 33 and 34 are the weekend. The trend
        // picks up a little slope from the spikes at the end of each week.
        let monday = future[0].yhat;
        assert!((monday - 10.0).abs() < 3.0, "monday {monday}");
        assert!(future[5].yhat - monday > 8.0);
        assert!(future[6].yhat - monday > 8.0);
    }

    #[test]
    fn test_intervals_bracket_and_widen() {
        let values = [5.0, 7.0, 4.0, 8.0, 6.0, 5.0, 9.0, 3.0, 6.0, 7.0];
        let forecast = fit_and_project(&daily(&values), 5, 0.8).unwrap();

        for p in &forecast {
            assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
        }
        let width = |p: &ForecastPoint| p.yhat_upper - p.yhat_lower;
        assert!(width(&forecast[14]) > width(&forecast[10]));
    }

    #[test]
    fn test_duplicate_dates_collapse_in_output() {
        let mut points = daily(&[1.0, 2.0, 3.0]);
        points.push((start() + Days::new(2), 4.0));
        let forecast = fit_and_project(&points, 2, 0.8).unwrap();

        assert_eq!(forecast.len(), 5);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            fit_and_project(&daily(&[1.0]), 5, 0.8),
            Err(ModelError::InsufficientData { .. })
        ));
        assert!(matches!(
            fit_and_project(&daily(&[1.0, f64::NAN]), 5, 0.8),
            Err(ModelError::NumericalError(_))
        ));
    }

    #[test]
    fn test_z_score_for_eighty_percent() {
        let z = z_score(0.8).unwrap();
        assert!((z - 1.2816).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_model_trait_runs_on_series() {
        let observations = (0..12)
            .map(|i| Observation::new(start() + Days::new(i), 1, 3.0))
            .collect();
        let series = EntitySeries::new(1, observations);

        let forecast = AdditiveTrendModel::new(0.8).forecast(&series, 30).await.unwrap();

        assert_eq!(forecast.len(), 42);
        assert!(forecast.iter().all(|p| (p.yhat - 3.0).abs() < 1e-9));
    }
}

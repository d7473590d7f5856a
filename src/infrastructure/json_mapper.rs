// Mapper to convert domain models to the JSON response body
use crate::domain::forecast::{EntityForecastResult, ForecastPoint};
use crate::domain::leaderboard::{ForecastOutcome, ForecastWarning};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResponse {
    pub top_products: Vec<ProductForecast>,
    pub text_summary: String,
    #[serde(default)]
    pub warnings: Vec<WarningBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductForecast {
    pub product_id: i64,
    pub forecasted_sales: f64,
    pub peak_day: Option<NaiveDate>,
    pub peak_value: Option<f64>,
    pub top_days: Vec<DayForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_forecast: Option<Vec<DayForecast>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarningBody {
    pub product_id: i64,
    pub message: String,
}

pub fn outcome_to_response(outcome: &ForecastOutcome) -> ForecastResponse {
    ForecastResponse {
        top_products: outcome
            .leaderboard
            .entries()
            .iter()
            .map(product_to_response)
            .collect(),
        text_summary: outcome.summary.as_str().to_string(),
        warnings: outcome.warnings.iter().map(warning_to_response).collect(),
    }
}

fn product_to_response(result: &EntityForecastResult) -> ProductForecast {
    let peak = result.peak();
    ProductForecast {
        product_id: result.product_id,
        forecasted_sales: result.forecast_sum,
        peak_day: peak.map(|p| p.ds),
        peak_value: peak.map(|p| p.yhat),
        top_days: result.peaks.iter().map(day_to_response).collect(),
        full_forecast: result
            .full_forecast
            .as_ref()
            .map(|points| points.iter().map(day_to_response).collect()),
    }
}

fn day_to_response(point: &ForecastPoint) -> DayForecast {
    DayForecast {
        date: point.ds,
        value: point.yhat,
        lower: point.yhat_lower,
        upper: point.yhat_upper,
    }
}

fn warning_to_response(warning: &ForecastWarning) -> WarningBody {
    WarningBody {
        product_id: warning.product_id,
        message: warning.message.clone(),
    }
}

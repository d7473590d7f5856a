// Error taxonomy for the forecasting pipeline
use super::sales::ProductId;
use thiserror::Error;

/// Failures surfaced to the caller of the forecasting pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing columns, unparsable dates, non-numeric values.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("forecast failed for product {product_id}: {reason}")]
    ForecastFailure { product_id: ProductId, reason: String },

    #[error("forecast for product {product_id} timed out after {millis}ms")]
    Timeout { product_id: ProductId, millis: u64 },

    #[error("failed to serialize forecast response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("upload storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ForecastError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Product the failure belongs to, if it is scoped to a single entity.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::ForecastFailure { product_id, .. } | Self::Timeout { product_id, .. } => {
                Some(*product_id)
            }
            _ => None,
        }
    }
}

/// Failures raised by a forecasting model for a single series.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("numerical error: {0}")]
    NumericalError(String),

    #[error("model error: {0}")]
    Internal(String),
}

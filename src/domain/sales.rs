// Sales history domain models
use chrono::NaiveDate;

pub type ProductId = i64;

/// One (date, product, value) row from the uploaded table.
///
/// `y` is `None` when the cell was blank: the row still counts toward the
/// product's observation count but is left out of the fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub ds: NaiveDate,
    pub product_id: ProductId,
    pub y: Option<f64>,
}

impl Observation {
    pub fn new(ds: NaiveDate, product_id: ProductId, y: f64) -> Self {
        Self {
            ds,
            product_id,
            y: Some(y),
        }
    }

    pub fn missing(ds: NaiveDate, product_id: ProductId) -> Self {
        Self {
            ds,
            product_id,
            y: None,
        }
    }
}

/// All observations of a single product, ascending by date.
///
/// Duplicate dates are kept in input order; nothing downstream requires
/// them to be unique.
#[derive(Debug, Clone)]
pub struct EntitySeries {
    pub product_id: ProductId,
    observations: Vec<Observation>,
}

impl EntitySeries {
    pub fn new(product_id: ProductId, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.ds);
        Self {
            product_id,
            observations,
        }
    }

    pub fn has_sufficient_data(&self, min_observations: usize) -> bool {
        self.len() >= min_observations
    }

    /// Rows in the series, blank values included.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// (date, value) pairs with a value, in date order: what a model fits.
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.observations
            .iter()
            .filter_map(|o| o.y.map(|y| (o.ds, y)))
            .collect()
    }
}

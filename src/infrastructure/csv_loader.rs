//! CSV sales history loader.
//!
//! Parses an uploaded table into per-product series. Required columns:
//!   product_id, ds, y
//! Column order is free and extra columns are ignored.

use crate::domain::error::ForecastError;
use crate::domain::sales::{EntitySeries, Observation, ProductId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const PRODUCT_COLUMN: &str = "product_id";
const DATE_COLUMN: &str = "ds";
const VALUE_COLUMN: &str = "y";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

struct ColumnIndex {
    product_id: usize,
    ds: usize,
    y: usize,
}

/// Load per-product series from a CSV reader, ascending by product id.
pub fn load_series<R: Read>(reader: R) -> Result<Vec<EntitySeries>, ForecastError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ForecastError::malformed(format!("unreadable header: {}", e)))?
        .clone();

    // Zero-byte upload: no header, no rows.
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Vec::new());
    }

    let columns = locate_columns(&headers)?;

    let mut groups: BTreeMap<ProductId, Vec<Observation>> = BTreeMap::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let line = line_num + 2;
        let record = result
            .map_err(|e| ForecastError::malformed(format!("CSV parse error at line {}: {}", line, e)))?;

        let field = |idx: usize| record.get(idx).unwrap_or("");

        // Rows without a product cannot be grouped.
        let raw_id = field(columns.product_id);
        if raw_id.is_empty() {
            tracing::debug!(line, "skipping row without product_id");
            continue;
        }

        let product_id = parse_product_id(raw_id)
            .map_err(|e| ForecastError::malformed(format!("line {}: {}", line, e)))?;
        let ds = parse_date(field(columns.ds))
            .map_err(|e| ForecastError::malformed(format!("line {}: {}", line, e)))?;

        let raw_y = field(columns.y);
        let observation = if raw_y.is_empty() {
            tracing::debug!(line, product_id, "row has no value");
            Observation::missing(ds, product_id)
        } else {
            let y = raw_y.parse::<f64>().map_err(|_| {
                ForecastError::malformed(format!("line {}: value '{}' is not numeric", line, raw_y))
            })?;
            Observation::new(ds, product_id, y)
        };

        groups.entry(product_id).or_default().push(observation);
    }

    Ok(groups
        .into_iter()
        .map(|(product_id, observations)| EntitySeries::new(product_id, observations))
        .collect())
}

/// Load per-product series from a CSV file path.
pub fn load_series_file(path: &Path) -> Result<Vec<EntitySeries>, ForecastError> {
    let file = std::fs::File::open(path)?;
    load_series(file)
}

fn locate_columns(headers: &csv::StringRecord) -> Result<ColumnIndex, ForecastError> {
    let find = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<&str> = [PRODUCT_COLUMN, DATE_COLUMN, VALUE_COLUMN]
        .into_iter()
        .filter(|name| find(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::malformed(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    Ok(ColumnIndex {
        product_id: find(PRODUCT_COLUMN).unwrap_or_default(),
        ds: find(DATE_COLUMN).unwrap_or_default(),
        y: find(VALUE_COLUMN).unwrap_or_default(),
    })
}

/// Integer ids, also accepting integral floats such as `7.0`.
fn parse_product_id(raw: &str) -> Result<ProductId, String> {
    if let Ok(id) = raw.parse::<ProductId>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as ProductId),
        _ => Err(format!("product_id '{}' is not an integer", raw)),
    }
}

/// Calendar date of a timestamp; any time of day is dropped.
fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("unparsable date '{}'", raw))
}

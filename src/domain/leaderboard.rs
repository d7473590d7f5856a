// Leaderboard domain model - ranking of per-product forecasts
use super::forecast::EntityForecastResult;
use super::sales::ProductId;
use super::summary::SummaryReport;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// Products ranked by forecast sum, highest first.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    entries: Vec<EntityForecastResult>,
}

impl Leaderboard {
    /// Rank results descending by `forecast_sum` and keep the first `size`.
    ///
    /// The sort is stable, so equal sums keep their input order.
    pub fn rank(mut results: Vec<EntityForecastResult>, size: usize) -> Self {
        results.sort_by(|a, b| b.forecast_sum.total_cmp(&a.forecast_sum));
        results.truncate(size);
        Self { entries: results }
    }

    pub fn entries(&self) -> &[EntityForecastResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A per-product failure that was skipped instead of failing the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastWarning {
    pub product_id: ProductId,
    pub message: String,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub leaderboard: Leaderboard,
    pub summary: SummaryReport,
    pub warnings: Vec<ForecastWarning>,
}

impl ForecastOutcome {
    pub fn new(leaderboard: Leaderboard, warnings: Vec<ForecastWarning>) -> Self {
        let summary = SummaryReport::render(&leaderboard);
        Self {
            leaderboard,
            summary,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(product_id: ProductId, forecast_sum: f64) -> EntityForecastResult {
        EntityForecastResult {
            product_id,
            forecast_sum,
            peaks: Vec::new(),
            full_forecast: None,
        }
    }

    fn ids(board: &Leaderboard) -> Vec<ProductId> {
        board.entries().iter().map(|e| e.product_id).collect()
    }

    #[test]
    fn test_rank_keeps_top_five_descending() {
        let results = vec![
            result(1, 10.0),
            result(2, 60.0),
            result(3, 30.0),
            result(4, 50.0),
            result(5, 20.0),
            result(6, 40.0),
        ];

        let board = Leaderboard::rank(results, DEFAULT_LEADERBOARD_SIZE);

        assert_eq!(ids(&board), vec![2, 4, 6, 3, 5]);
        for pair in board.entries().windows(2) {
            assert!(pair[0].forecast_sum >= pair[1].forecast_sum);
        }
    }

    #[test]
    fn test_rank_never_pads() {
        let board = Leaderboard::rank(vec![result(1, 1.0), result(2, 2.0)], 5);
        assert_eq!(board.len(), 2);

        let empty = Leaderboard::rank(Vec::new(), 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let results = vec![result(3, 5.0), result(1, 7.0), result(2, 5.0), result(4, 5.0)];

        let board = Leaderboard::rank(results, 3);

        assert_eq!(ids(&board), vec![1, 3, 2]);
    }
}

// Text summary of a leaderboard
use super::leaderboard::Leaderboard;

const HEADER: &str = "Top products by forecasted sales volume:\n\n";

/// Human readable rendering of a [`Leaderboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport(String);

impl SummaryReport {
    pub fn render(leaderboard: &Leaderboard) -> Self {
        let mut text = String::from(HEADER);

        for (rank, entry) in leaderboard.entries().iter().enumerate() {
            text.push_str(&format!(
                "{}. Product ID: {}, expected volume: {:.2}\n",
                rank + 1,
                entry.product_id,
                entry.forecast_sum
            ));
            for peak in &entry.peaks {
                text.push_str(&format!(
                    "   Peak: {} - {:.2} sales\n",
                    peak.ds.format("%Y-%m-%d"),
                    peak.yhat
                ));
            }
        }

        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

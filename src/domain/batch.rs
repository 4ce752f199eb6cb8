use serde::Serialize;

use super::scrape_result::ScrapeResult;

/// Outcome of one batch. Counts are derived from `results`, so
/// `total == success + failed == results.len()` holds by construction.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub results: Vec<ScrapeResult>,
}

impl From<Vec<ScrapeResult>> for BatchSummary {
    fn from(results: Vec<ScrapeResult>) -> Self {
        let success = results.iter().filter(|r| r.is_success()).count();

        BatchSummary {
            total: results.len(),
            success,
            failed: results.len() - success,
            results,
        }
    }
}

use std::time::Duration;

use futures::{stream, StreamExt};
use tokio::{
    sync::Mutex,
    time::{sleep_until, Instant},
};

use crate::domain::{BatchSummary, Origin};

use super::ScrapeExecutor;

const URL_COLUMNS: [&str; 2] = ["url", "link"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("{0}")]
    MalformedInput(String),
}

/// Runs the executor over a list of URLs. Each URL is scraped on its own, so
/// a failure only ever shows up in that URL's result.
#[derive(Clone)]
pub struct BatchProcessor {
    executor: ScrapeExecutor,
    concurrency: usize,
    request_delay: Duration,
}

impl BatchProcessor {
    pub fn new(executor: ScrapeExecutor, concurrency: usize) -> Self {
        BatchProcessor {
            executor,
            concurrency: concurrency.max(1),
            request_delay: Duration::ZERO,
        }
    }

    /// Minimum gap between the starts of two items of the same batch.
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Results come back in input order whatever order the fetches finish in.
    pub async fn process_batch(
        &self,
        urls: Vec<String>,
        origin: Origin,
    ) -> Result<BatchSummary, BatchError> {
        if urls.is_empty() {
            return Err(BatchError::MalformedInput(
                "No URLs provided for batch processing".to_string(),
            ));
        }

        log::info!(
            "Starting batch of {} urls with concurrency {}",
            urls.len(),
            self.concurrency
        );

        let last_start = Mutex::new(None);
        let results = stream::iter(urls)
            .map(|url| {
                let last_start = &last_start;
                async move {
                    self.pace(last_start).await;
                    self.executor.execute(&url, origin).await
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let summary = BatchSummary::from(results);
        log::info!(
            "Finished batch: {} total, {} success, {} failed",
            summary.total,
            summary.success,
            summary.failed
        );

        Ok(summary)
    }

    async fn pace(&self, last_start: &Mutex<Option<Instant>>) {
        if self.request_delay.is_zero() {
            return;
        }

        let mut last_start = last_start.lock().await;
        if let Some(previous) = *last_start {
            sleep_until(previous + self.request_delay).await;
        }
        *last_start = Some(Instant::now());
    }
}

/// Pulls the URL column out of an uploaded CSV file. The column is the first
/// header named `url` or `link` (any case); blank cells are skipped.
pub fn parse_url_column(content: &[u8]) -> Result<Vec<String>, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = reader
        .headers()
        .map_err(|e| BatchError::MalformedInput(format!("Unreadable CSV header: {}", e)))?
        .clone();

    let column = headers
        .iter()
        .position(|h| {
            let h = h.trim_start_matches('\u{feff}').trim().to_lowercase();
            URL_COLUMNS.contains(&h.as_str())
        })
        .ok_or_else(|| {
            BatchError::MalformedInput(
                "No URLs found in CSV. Please ensure there's a column named 'url', 'URL', 'link', or 'Link'"
                    .to_string(),
            )
        })?;

    let mut urls = vec![];
    for record in reader.records() {
        let record =
            record.map_err(|e| BatchError::MalformedInput(format!("Unreadable CSV row: {}", e)))?;
        if let Some(url) = record.get(column).filter(|u| !u.is_empty()) {
            urls.push(url.to_string());
        }
    }

    match urls.is_empty() {
        true => Err(BatchError::MalformedInput(
            "No URLs found in CSV. The URL column is empty".to_string(),
        )),
        false => Ok(urls),
    }
}

use std::sync::Arc;

use crate::{
    dal::ResultStore,
    domain::{FieldMap, Origin, ScrapeResult},
};

use super::{FieldExtractor, PageFetcher};

/// Scrapes one URL into one stored result. Every failure is captured in the
/// returned result; nothing propagates past `execute`.
#[derive(Clone)]
pub struct ScrapeExecutor {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn FieldExtractor>,
    store: Arc<dyn ResultStore>,
    follow_website: bool,
}

impl ScrapeExecutor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn FieldExtractor>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        ScrapeExecutor {
            fetcher,
            extractor,
            store,
            follow_website: false,
        }
    }

    /// Also visit the company website found on a page and fill in whatever
    /// the first page did not provide.
    pub fn follow_website(mut self, follow: bool) -> Self {
        self.follow_website = follow;
        self
    }

    pub async fn execute(&self, url: &str, origin: Origin) -> ScrapeResult {
        log::info!("Scraping {} ({})", url, origin);

        let result = match self.scrape(url).await {
            Ok(fields) => ScrapeResult::success(url, fields, origin),
            Err(reason) => {
                log::error!("Scrape of {} failed: {}", url, reason);
                ScrapeResult::failed(url, reason, origin)
            }
        };

        if let Err(e) = self.store.append(&result).await {
            log::error!("Failed to store result {} for {}: {:?}", result.id, url, e);
        }

        result
    }

    async fn scrape(&self, url: &str) -> Result<FieldMap, String> {
        let content = self.fetcher.fetch(url).await.map_err(|e| e.to_string())?;
        let mut fields = self
            .extractor
            .extract(&content)
            .map_err(|e| e.to_string())?;

        if self.follow_website {
            if let Some(website) = fields.website.clone() {
                fields.merge_missing(self.website_fields(&website).await);
            }
        }

        Ok(fields)
    }

    async fn website_fields(&self, website: &str) -> FieldMap {
        let website = match website.starts_with("http") {
            true => website.to_string(),
            false => format!("https://{}", website),
        };

        let extracted = match self.fetcher.fetch(&website).await {
            Ok(content) => self.extractor.extract(&content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        extracted.unwrap_or_else(|e| {
            log::error!("Ignoring website {}: {}", website, e);
            FieldMap::default()
        })
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("InvalidUrl: {0}")]
    InvalidUrl(String),
    #[error("Timeout: no response within {0:?}")]
    Timeout(Duration),
    #[error("NetworkError: {0}")]
    NetworkError(String),
    #[error("HttpError: status {0}")]
    HttpError(u16),
}

/// Retrieves the body of a page. Implementations make a single attempt.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Accepts only absolute http(s) URLs with a host.
pub fn parse_page_url(url: &str) -> Result<Url, FetchError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FetchError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                trimmed, scheme
            )))
        }
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(FetchError::InvalidUrl(format!("{}: missing host", trimmed))),
    }
}

/// Upper bound on a page body unless configured otherwise.
pub const DEFAULT_MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

/// Keeps no cookies between requests, so every scrape starts from a clean
/// session.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_page_bytes: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(HttpFetcher {
            client,
            timeout,
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
        })
    }

    /// Bodies larger than this fail with `NetworkError` instead of being read.
    pub fn max_page_bytes(mut self, max_page_bytes: usize) -> Self {
        self.max_page_bytes = max_page_bytes;
        self
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::NetworkError(e.to_string())
        }
    }

    fn too_large(&self, url: &Url) -> FetchError {
        log::error!("Page {} is larger than {} bytes", url, self.max_page_bytes);
        FetchError::NetworkError(format!("page larger than {} bytes", self.max_page_bytes))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = parse_page_url(url)?;

        let mut res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = res.status();
        if !status.is_success() {
            log::error!("Got status {} from {}", status, url);
            return Err(FetchError::HttpError(status.as_u16()));
        }

        if res
            .content_length()
            .is_some_and(|len| len > self.max_page_bytes as u64)
        {
            return Err(self.too_large(&url));
        }

        let mut body: Vec<u8> = vec![];
        while let Some(chunk) = res.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > self.max_page_bytes {
                return Err(self.too_large(&url));
            }
            body.extend_from_slice(&chunk);
        }
        log::info!("Fetched {} bytes from {}", body.len(), url);

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

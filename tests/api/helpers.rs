use std::{net::TcpListener, sync::Arc, time::Duration};

use startup_mine::{
    dal::{MemoryApiKeyStore, MemoryResultStore},
    services::{
        ApiKeyAuthority, BatchProcessor, HttpFetcher, ScrapeExecutor, StartupProfileExtractor,
    },
    startup::run,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const FETCH_TIMEOUT: Duration = Duration::from_millis(500);

pub const PROFILE_PAGE: &str = r#"<html><body>
    <h1>Acme Robotics</h1>
    <dl>
        <dt class="label">Website</dt><dd>https://www.acme.example</dd>
        <dt class="label">Stage</dt><dd>Seed</dd>
        <dt class="label">Industry</dt><dd>Robotics, Automation</dd>
    </dl>
    <p>Reach us at hello@acme.example</p>
</body></html>"#;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub pages: MockServer,
}

impl TestApp {
    pub fn url(&self, route: &str) -> String {
        format!("{}/api{}", self.address, route)
    }

    /// Serves `html` from the page server and returns its URL.
    pub async fn page(&self, route: &str, html: &str) -> String {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.pages)
            .await;
        format!("{}{}", self.pages.uri(), route)
    }

    /// A page that answers only after the fetch timeout has passed.
    pub async fn slow_page(&self, route: &str) -> String {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<h1>Too late</h1>")
                    .set_delay(FETCH_TIMEOUT * 4),
            )
            .mount(&self.pages)
            .await;
        format!("{}{}", self.pages.uri(), route)
    }

    pub async fn post_scrape(&self, url: &str) -> reqwest::Response {
        self.client
            .post(self.url("/scrape"))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_bulk(&self, urls: &[String]) -> reqwest::Response {
        self.client
            .post(self.url("/scrape/bulk"))
            .json(&serde_json::json!({ "urls": urls }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_api_key(&self, name: &str) -> serde_json::Value {
        self.client
            .post(self.url("/api-keys"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .unwrap()
    }
}

pub async fn spawn_app() -> TestApp {
    let pages = MockServer::start().await;

    let results = Arc::new(MemoryResultStore::new());
    let fetcher = HttpFetcher::new(FETCH_TIMEOUT, "startup-mine-test").unwrap();
    let executor = ScrapeExecutor::new(
        Arc::new(fetcher),
        Arc::new(StartupProfileExtractor),
        results.clone(),
    );
    let batch = BatchProcessor::new(executor.clone(), 4);
    let authority = ApiKeyAuthority::new(Arc::new(MemoryApiKeyStore::new()));

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server =
        run(listener, executor, batch, results, authority).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        pages,
    }
}

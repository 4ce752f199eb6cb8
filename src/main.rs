use std::{net::TcpListener, sync::Arc, time::Duration};

use anyhow::Context;
use env_logger::Env;
use sqlx::postgres::PgPoolOptions;
use startup_mine::{
    configuration::{get_configuration, StorageBackend},
    dal::{
        ApiKeyStore, MemoryApiKeyStore, MemoryResultStore, PgApiKeyStore, PgResultStore,
        ResultStore,
    },
    services::{
        ApiKeyAuthority, BatchProcessor, HttpFetcher, ScrapeExecutor, StartupProfileExtractor,
    },
    startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration")?;

    let (results, api_keys): (Arc<dyn ResultStore>, Arc<dyn ApiKeyStore>) =
        match configuration.application.storage {
            StorageBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(20)
                    .acquire_timeout(Duration::from_secs(10))
                    .idle_timeout(Duration::from_secs(15 * 60))
                    .connect_lazy_with(configuration.database.with_db());
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;

                (
                    Arc::new(PgResultStore::new(pool.clone())),
                    Arc::new(PgApiKeyStore::new(pool)),
                )
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage, nothing survives a restart");
                (
                    Arc::new(MemoryResultStore::new()),
                    Arc::new(MemoryApiKeyStore::new()),
                )
            }
        };

    let scraper = &configuration.scraper;
    let fetcher = HttpFetcher::new(scraper.timeout(), &scraper.user_agent())
        .context("Failed to build http client")?
        .max_page_bytes(scraper.max_page_bytes);
    let executor = ScrapeExecutor::new(
        Arc::new(fetcher),
        Arc::new(StartupProfileExtractor),
        results.clone(),
    )
    .follow_website(scraper.follow_website);
    let batch = BatchProcessor::new(executor.clone(), scraper.batch_concurrency)
        .request_delay(scraper.request_delay());
    let authority = ApiKeyAuthority::new(api_keys);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener =
        TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    log::info!("Listening on {}", address);

    run(listener, executor, batch, results, authority)?.await?;
    Ok(())
}

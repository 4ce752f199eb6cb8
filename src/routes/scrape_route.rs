use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;

use crate::{
    domain::Origin,
    services::{parse_url_column, BatchProcessor, ScrapeExecutor},
};

use super::ApiError;

#[derive(Deserialize)]
pub struct ScrapeBody {
    pub url: String,
}

#[derive(Deserialize)]
pub struct BulkScrapeBody {
    pub urls: Vec<String>,
}

#[post("")]
async fn scrape(
    executor: web::Data<ScrapeExecutor>,
    body: web::Json<ScrapeBody>,
) -> HttpResponse {
    let result = executor.execute(body.url.trim(), Origin::Single).await;
    HttpResponse::Ok().json(result)
}

#[post("/bulk")]
async fn scrape_bulk(
    batch: web::Data<BatchProcessor>,
    body: web::Json<BulkScrapeBody>,
) -> Result<HttpResponse, ApiError> {
    let summary = batch
        .process_batch(trimmed(body.into_inner().urls), Origin::Bulk)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[post("/upload-csv")]
async fn upload_csv(
    batch: web::Data<BatchProcessor>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let content = read_csv_upload(payload).await?;
    let urls = parse_url_column(&content)?;
    log::info!("Received csv upload with {} urls", urls.len());

    let summary = batch.process_batch(urls, Origin::Bulk).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Reads the first file field of the form; it has to be named `*.csv`.
async fn read_csv_upload(mut payload: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| ApiError::BadRequest(format!("Bad upload: {}", e)))?;

        let file_name = match field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
        {
            Some(name) => name.to_lowercase(),
            None => continue,
        };
        if !file_name.ends_with(".csv") {
            return Err(ApiError::BadRequest("File must be a CSV".to_string()));
        }

        let mut content = vec![];
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| ApiError::BadRequest(format!("Bad upload: {}", e)))?;
            content.extend_from_slice(&chunk);
        }
        return Ok(content);
    }

    Err(ApiError::BadRequest("No CSV file in upload".to_string()))
}

pub(super) fn trimmed(urls: Vec<String>) -> Vec<String> {
    urls.into_iter().map(|u| u.trim().to_string()).collect()
}

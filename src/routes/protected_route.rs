use actix_web::{http::header, post, web, HttpRequest, HttpResponse};

use crate::{
    domain::{ApiKey, Origin},
    services::{ApiKeyAuthority, BatchProcessor, ScrapeExecutor},
};

use super::{
    scrape_route::{trimmed, BulkScrapeBody, ScrapeBody},
    ApiError,
};

#[post("/scrape")]
async fn protected_scrape(
    req: HttpRequest,
    authority: web::Data<ApiKeyAuthority>,
    executor: web::Data<ScrapeExecutor>,
    body: web::Json<ScrapeBody>,
) -> Result<HttpResponse, ApiError> {
    let api_key = authorize(&req, &authority).await?;
    log::info!("Protected scrape by key {} ({})", api_key.id, api_key.name);

    let result = executor.execute(body.url.trim(), Origin::Api).await;
    Ok(HttpResponse::Ok().json(result))
}

#[post("/scrape/bulk")]
async fn protected_scrape_bulk(
    req: HttpRequest,
    authority: web::Data<ApiKeyAuthority>,
    batch: web::Data<BatchProcessor>,
    body: web::Json<BulkScrapeBody>,
) -> Result<HttpResponse, ApiError> {
    let api_key = authorize(&req, &authority).await?;
    log::info!("Protected bulk scrape by key {} ({})", api_key.id, api_key.name);

    let summary = batch
        .process_batch(trimmed(body.into_inner().urls), Origin::Api)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

async fn authorize(req: &HttpRequest, authority: &ApiKeyAuthority) -> Result<ApiKey, ApiError> {
    let token = bearer_token(req).ok_or_else(|| {
        ApiError::Unauthorized("Missing or malformed Authorization header".to_string())
    })?;
    Ok(authority.authorize(token).await?)
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    match scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        true => Some(token),
        false => None,
    }
}

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::dal::ResultStore;

use super::ApiError;

const DEFAULT_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct ListResultsQuery {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[get("")]
async fn list_results(
    store: web::Data<dyn ResultStore>,
    query: web::Query<ListResultsQuery>,
) -> Result<HttpResponse, ApiError> {
    let results = store
        .list(
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.skip.unwrap_or(0),
        )
        .await?;
    Ok(HttpResponse::Ok().json(results))
}

#[get("/{id}")]
async fn get_result(
    store: web::Data<dyn ResultStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    match store.get(id).await? {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::NotFound(format!("Result {} not found", id))),
    }
}

/// Totals over the whole log, not just the latest page.
#[get("/stats")]
async fn stats(store: web::Data<dyn ResultStore>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(store.stats().await?))
}

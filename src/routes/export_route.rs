use actix_web::{
    get,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::{
    dal::ResultStore,
    services::{export, ExportFormat},
};

use super::ApiError;

#[derive(Deserialize)]
pub struct ExportQuery {
    pub limit: Option<usize>,
}

#[get("/{format}")]
async fn export_results(
    store: web::Data<dyn ResultStore>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    let format: ExportFormat = path.parse()?;

    let results = match query.limit {
        Some(limit) => store.list(limit, 0).await?,
        None => store.all().await?,
    };
    if results.is_empty() {
        return Err(ApiError::NotFound("No results found".to_string()));
    }

    let body = export(format, &results)?;
    log::info!("Exported {} results as {:?}", results.len(), format);

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format.file_name().to_string())],
        })
        .body(body))
}

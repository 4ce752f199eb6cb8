use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::services::ApiKeyAuthority;

use super::ApiError;

#[derive(Deserialize)]
pub struct CreateApiKeyBody {
    pub name: String,
}

#[get("")]
async fn list_api_keys(authority: web::Data<ApiKeyAuthority>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(authority.list().await?))
}

/// The response is the only place the full token ever appears.
#[post("")]
async fn create_api_key(
    authority: web::Data<ApiKeyAuthority>,
    body: web::Json<CreateApiKeyBody>,
) -> Result<HttpResponse, ApiError> {
    let issued = authority.create(&body.name).await?;
    Ok(HttpResponse::Ok().json(issued))
}

#[delete("/{id}")]
async fn deactivate_api_key(
    authority: web::Data<ApiKeyAuthority>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let api_key = authority.deactivate(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "API key deactivated",
        "api_key": api_key,
    })))
}

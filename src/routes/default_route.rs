use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Data Scraping API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

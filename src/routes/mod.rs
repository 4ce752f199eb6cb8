pub mod api_key_route;
pub mod default_route;
pub mod error;
pub mod export_route;
pub mod protected_route;
pub mod result_route;
pub mod scrape_route;

pub use error::ApiError;

pub mod api_key;
pub mod batch;
pub mod scrape_result;

pub use api_key::*;
pub use batch::*;
pub use scrape_result::*;

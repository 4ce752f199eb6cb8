pub mod batch;
pub mod executor;
pub mod export;
pub mod extractor;
pub mod fetcher;
pub mod key_authority;

pub use batch::*;
pub use executor::*;
pub use export::*;
pub use extractor::*;
pub use fetcher::*;
pub use key_authority::*;

mod api_keys;
mod export;
mod helpers;
mod results;
mod scrape;

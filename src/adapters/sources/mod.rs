//! External draw data sources (three-tier acquisition fallback).

pub mod bulk_file;
pub mod results_api;
pub mod web_scrape;

pub use bulk_file::BulkFileSource;
pub use results_api::ResultsApiSource;
pub use web_scrape::WebScrapeSource;

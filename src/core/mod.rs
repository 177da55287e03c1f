pub mod config;
mod crawler;
mod errors;
mod record;
pub mod runner;

pub use config::{BackendKind, ScrapeConfig, SelectorSet, SourceConfig};
pub use crawler::Crawler;
pub use errors::{ScraperError, ScraperResult};
pub use record::{PageRange, ProductRecord, DEFAULT_MAX_PAGE};
pub use runner::{run_scraping, scrape_source};

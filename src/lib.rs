pub mod core;
pub mod scrapers;
pub mod stats;
pub mod storage;

pub use crate::core::{run_scraping, Crawler, ProductRecord, ScrapeConfig, SourceConfig};
pub use crate::core::{ScraperError, ScraperResult};
pub use scrapers::{Browser, Element};
pub use stats::StatsTracker;
pub use storage::{CsvStorage, RunReport, SourceReport, SourceStatus};

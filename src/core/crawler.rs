use super::config::{SelectorSet, SourceConfig};
use super::record::{PageRange, ProductRecord};
use super::ScraperResult;
use crate::scrapers::{Browser, Element};
use crate::stats::{Field, StatsTracker};
use log::{debug, info, warn};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Read<'a> {
    Attr(&'a str),
    Text,
}

/// Walks a listing page by page and turns each product container into a
/// `ProductRecord`.
pub struct Crawler {
    stats: Arc<StatsTracker>,
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

impl Crawler {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(StatsTracker::new()),
        }
    }

    pub fn with_stats(stats: Arc<StatsTracker>) -> Self {
        Self { stats }
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Extracts every page of `source` and then closes `browser`, whether
    /// extraction succeeded or not.
    pub async fn run<B: Browser>(
        &self,
        mut browser: B,
        source: &SourceConfig,
    ) -> ScraperResult<Vec<ProductRecord>> {
        info!(
            "Starting source {} with {} browser ({} pages)",
            source.name,
            browser.name(),
            source.max_page
        );

        let result = self.extract_pages(&mut browser, source).await;
        let closed = browser.close().await;
        self.stats.finish();

        match (result, closed) {
            (Ok(records), Ok(())) => {
                info!(
                    "Source {} completed with {} products",
                    source.name,
                    records.len()
                );
                Ok(records)
            }
            (Ok(records), Err(e)) => {
                warn!("Failed to close browser for {}: {}", source.name, e);
                Ok(records)
            }
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!("Failed to close browser for {}: {}", source.name, close_err);
                }
                Err(e)
            }
        }
    }

    pub async fn extract_pages<B: Browser>(
        &self,
        browser: &mut B,
        source: &SourceConfig,
    ) -> ScraperResult<Vec<ProductRecord>> {
        let mut records = Vec::new();

        for page in PageRange::new(source.max_page) {
            let url = source.page_url(page);
            info!("Fetching page {}/{}: {}", page, source.max_page, url);

            browser.navigate(&url).await?;
            browser.wait(source.page_delay()).await;

            let containers = browser.find_all(&source.selectors.container).await?;
            self.stats.record_page(containers.len());
            if containers.is_empty() {
                warn!("No products found on page {} ({})", page, url);
                continue;
            }
            debug!("Found {} products on page {}", containers.len(), page);

            for container in &containers {
                records.push(self.extract_item(container, &source.selectors).await);
            }
        }

        Ok(records)
    }

    /// Each field is read on its own; a miss leaves that field empty and
    /// nothing else.
    pub async fn extract_item<E: Element>(
        &self,
        container: &E,
        selectors: &SelectorSet,
    ) -> ProductRecord {
        let image_url = self
            .read_field(container, &selectors.image, Read::Attr("src"), Field::Image)
            .await;
        let name = self
            .read_field(container, &selectors.name, Read::Text, Field::Name)
            .await;
        let price = self
            .read_field(container, &selectors.price, Read::Text, Field::Price)
            .await;

        self.stats.record_item();
        ProductRecord {
            image_url,
            name,
            price,
        }
    }

    async fn read_field<E: Element>(
        &self,
        container: &E,
        selector: &str,
        read: Read<'_>,
        field: Field,
    ) -> String {
        let value = match container.find(selector).await {
            Ok(Some(element)) => match read {
                Read::Attr(name) => element.attr(name).await,
                Read::Text => element.text().await.map(Some),
            },
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match value {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Field {:?} not found with selector {}", field, selector);
                self.stats.record_missing(field);
                String::new()
            }
            Err(e) => {
                debug!("Field {:?} unreadable with selector {}: {}", field, selector, e);
                self.stats.record_missing(field);
                String::new()
            }
        }
    }
}

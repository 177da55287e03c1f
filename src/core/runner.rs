use super::config::{BackendKind, ScrapeConfig, SourceConfig};
use super::{Crawler, ScraperResult};
use crate::scrapers::{Browser, StaticBrowser, WebDriverBrowser};
use crate::storage::{CsvStorage, RunReport, SourceReport};
use log::{error, info, warn};

/// Scrapes one source with `browser` and writes its CSV. The browser is
/// closed before this returns.
pub async fn scrape_source<B: Browser>(
    browser: B,
    source: &SourceConfig,
) -> ScraperResult<SourceReport> {
    let crawler = Crawler::new();
    let records = crawler.run(browser, source).await?;

    let storage = CsvStorage::new(&source.output)?;
    let previous_count = storage.existing_count();
    let count = storage.write_products(&records)?;
    match previous_count {
        Some(previous) => info!(
            "Saved {} products from {} to {} (previously {})",
            count,
            source.name,
            storage.path().display(),
            previous
        ),
        None => info!(
            "Saved {} products from {} to {}",
            count,
            source.name,
            storage.path().display()
        ),
    }
    crawler.stats().print_summary();

    Ok(
        SourceReport::success(source.name.clone(), source.output.clone(), source.max_page, count)
            .with_previous_count(previous_count),
    )
}

fn static_browser(config: &ScrapeConfig) -> ScraperResult<StaticBrowser> {
    let browser = StaticBrowser::new()?;
    if config.headers.is_empty() {
        return Ok(browser);
    }
    let headers = config
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()));
    Ok(browser.with_headers(headers)?)
}

async fn run_source(config: &ScrapeConfig, source: &SourceConfig) -> ScraperResult<SourceReport> {
    match config.backend {
        BackendKind::WebDriver => {
            let browser = WebDriverBrowser::connect(&config.webdriver_url, config.headless).await?;
            scrape_source(browser, source).await
        }
        BackendKind::Static => scrape_source(static_browser(config)?, source).await,
    }
}

/// Runs every enabled source in order, each in its own browser session.
///
/// A failing source is recorded in the report and the run moves on to the
/// next one. The report is always finished and, when configured, saved.
pub async fn run_scraping(config: &ScrapeConfig) -> ScraperResult<RunReport> {
    config.validate()?;
    let mut report = RunReport::start();
    info!(
        "Run {} started with {} sources",
        report.run_id,
        config.sources.len()
    );
    if config.backend == BackendKind::WebDriver && !config.headers.is_empty() {
        warn!("Custom headers are only sent by the static backend");
    }

    for source in &config.sources {
        if !source.enabled {
            info!("Skipping disabled source {}", source.name);
            report.add_source(SourceReport::skipped(
                source.name.clone(),
                source.output.clone(),
            ));
            continue;
        }

        match run_source(config, source).await {
            Ok(source_report) => report.add_source(source_report),
            Err(e) => {
                error!("Source {} failed: {}", source.name, e);
                report.add_source(SourceReport::failure(
                    source.name.clone(),
                    source.output.clone(),
                    e,
                ));
            }
        }
    }

    report.finish();
    if let Some(path) = &config.report_path {
        report.save(path)?;
    }

    info!(
        "Run {} finished: {} products, {} failed sources",
        report.run_id,
        report.total(),
        report.failed().count()
    );
    Ok(report)
}

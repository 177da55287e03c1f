use anyhow::{bail, Context};
use catalog_scraper::{run_scraping, ScrapeConfig, SourceStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut logger = env_logger::Builder::new();
    logger
        .filter_level(log::LevelFilter::Warn)
        .filter_module("catalog_scraper", log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    // Optional path to a JSON config; the built-in storefront otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => ScrapeConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => ScrapeConfig::default(),
    };

    let report = run_scraping(&config).await.context("scraping failed")?;

    for source in &report.sources {
        match source.status {
            SourceStatus::Success => println!(
                "{}: {} products saved to {}",
                source.name,
                source.count,
                source.output.display()
            ),
            SourceStatus::Skipped => println!("{}: disabled, skipped", source.name),
            SourceStatus::Error => println!(
                "{}: failed: {}",
                source.name,
                source.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        bail!("{} of {} sources failed", failed, report.sources.len());
    }
    println!("Scraping completed. Data saved to CSV.");

    Ok(())
}

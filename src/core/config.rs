use super::record::DEFAULT_MAX_PAGE;
use super::{ScraperError, ScraperResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_SOURCE_NAME: &str = "hangDiaThoiDai";
pub const DEFAULT_BASE_URL: &str = "https://store.hangdiathoidai.com/collections/available-now";
pub const DEFAULT_OUTPUT: &str = "products.csv";
pub const DEFAULT_PAGE_DELAY_MS: u64 = 2000;
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// CSS selectors for one storefront's listing markup. `image`, `name` and
/// `price` are scoped to a single `container`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    pub container: String,
    pub image: String,
    pub name: String,
    pub price: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            container: ".grid__item .product-container".to_string(),
            image: "img".to_string(),
            name: "h4.product-name a".to_string(),
            price: ".product-price".to_string(),
        }
    }
}

impl SelectorSet {
    pub fn validate(&self) -> ScraperResult<()> {
        for selector in [&self.container, &self.image, &self.name, &self.price] {
            scraper::Selector::parse(selector).map_err(|e| ScraperError::SelectorError {
                selector: selector.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    WebDriver,
    Static,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub name: String,
    pub enabled: bool,
    pub base_url: Url,
    pub max_page: u32,
    pub page_delay_ms: u64,
    pub selectors: SelectorSet,
    pub output: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SOURCE_NAME.to_string(),
            enabled: true,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            max_page: DEFAULT_MAX_PAGE,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            selectors: SelectorSet::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, base_url: Url) -> Self {
        Self {
            name: name.into(),
            base_url,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_max_page(mut self, max_page: u32) -> Self {
        self.max_page = max_page;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_selectors(mut self, selectors: SelectorSet) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// `{base_url}?page={page}`, replacing any `page` already in the query.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "page")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("page", &page.to_string());
        url
    }

    pub fn validate(&self) -> ScraperResult<()> {
        if self.name.trim().is_empty() {
            return Err(ScraperError::ConfigError(
                "source name must not be empty".to_string(),
            ));
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ScraperError::ConfigError(format!(
                "source {} has unsupported url scheme: {}",
                self.name,
                self.base_url.scheme()
            )));
        }
        self.selectors.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub sources: Vec<SourceConfig>,
    pub backend: BackendKind,
    pub webdriver_url: String,
    pub headless: bool,
    /// Extra request headers, sent by the static backend only.
    pub headers: BTreeMap<String, String>,
    pub report_path: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            sources: vec![SourceConfig::default()],
            backend: BackendKind::default(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            headers: BTreeMap::new(),
            report_path: None,
        }
    }
}

impl ScrapeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScraperResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(
            "Loaded config from {} ({} sources)",
            path.as_ref().display(),
            config.sources.len()
        );
        config.validate()?;
        Ok(config)
    }

    pub fn with_sources(mut self, sources: Vec<SourceConfig>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> ScraperResult<()> {
        if self.sources.is_empty() {
            return Err(ScraperError::ConfigError(
                "at least one source is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            source.validate()?;
            if !names.insert(source.name.as_str()) {
                return Err(ScraperError::ConfigError(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
        }
        Ok(())
    }
}

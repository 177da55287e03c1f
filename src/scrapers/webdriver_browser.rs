use super::browser::{Browser, Element};
use crate::ScraperResult;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use log::{debug, info};
use serde_json::{json, Map, Value};
use url::Url;

/// A real browser session driven through a WebDriver server
/// (geckodriver or chromedriver).
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    pub async fn connect(webdriver_url: &str, headless: bool) -> ScraperResult<Self> {
        info!("Connecting to WebDriver at {}", webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(Self::capabilities(headless))
            .connect(webdriver_url)
            .await?;

        Ok(Self { client })
    }

    fn capabilities(headless: bool) -> Map<String, Value> {
        let mut caps = Map::new();
        if headless {
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["--headless"] }),
            );
            caps.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new", "--disable-gpu", "--disable-dev-shm-usage"] }),
            );
        }
        caps
    }
}

/// A "no such element" reply is a miss, not a failure.
fn found<T>(result: Result<T, CmdError>) -> ScraperResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_no_such_element() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone)]
pub struct WebDriverElement {
    inner: fantoccini::elements::Element,
}

#[async_trait]
impl Element for WebDriverElement {
    async fn find(&self, selector: &str) -> ScraperResult<Option<Self>> {
        let inner = found(self.inner.find(Locator::Css(selector)).await)?;
        Ok(inner.map(|inner| Self { inner }))
    }

    /// The DOM property first, so `src` and `href` come back resolved against
    /// the page; the raw attribute when there is no such property.
    async fn attr(&self, name: &str) -> ScraperResult<Option<String>> {
        match self.inner.prop(name).await? {
            Some(value) => Ok(Some(value)),
            None => Ok(self.inner.attr(name).await?),
        }
    }

    async fn text(&self) -> ScraperResult<String> {
        Ok(self.inner.text().await?)
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = WebDriverElement;

    fn name(&self) -> &'static str {
        "webdriver"
    }

    async fn navigate(&mut self, url: &Url) -> ScraperResult<()> {
        debug!("Navigating to {}", url);
        self.client.goto(url.as_str()).await?;
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> ScraperResult<Vec<WebDriverElement>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements
            .into_iter()
            .map(|inner| WebDriverElement { inner })
            .collect())
    }

    async fn close(self) -> ScraperResult<()> {
        info!("Quitting WebDriver session");
        self.client.close().await?;
        Ok(())
    }
}

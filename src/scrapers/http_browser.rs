use async_trait::async_trait;
use log::{debug, info};
use reqwest::{header, Client, ClientBuilder};
use thiserror::Error;
use url::Url;

use super::browser::Browser;
use super::html_element::{select_all, HtmlElement};
use crate::{ScraperError, ScraperResult};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum HttpBrowserError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] header::InvalidHeaderName),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] header::InvalidHeaderValue),
}

impl From<HttpBrowserError> for ScraperError {
    fn from(err: HttpBrowserError) -> Self {
        match err {
            HttpBrowserError::HttpError(e) => ScraperError::HttpError(e),
            other => ScraperError::ConfigError(other.to_string()),
        }
    }
}

/// Fetches pages over plain HTTP and queries the served HTML. Nothing is
/// rendered, so it only suits storefronts whose listing is server-side.
///
/// `src`/`href` values are resolved against the final response URL, as a
/// browser would. Elements are re-parsed per query; see [`HtmlElement`] for
/// the few tags that cannot be.
pub struct StaticBrowser {
    client: Client,
    current: Option<(Url, String)>,
}

impl StaticBrowser {
    pub fn new() -> Result<Self, HttpBrowserError> {
        let client = ClientBuilder::new()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            current: None,
        })
    }

    pub fn with_headers<'a>(
        mut self,
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, HttpBrowserError> {
        let mut header_map = header::HeaderMap::new();
        header_map.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(DEFAULT_USER_AGENT),
        );

        for (key, value) in headers {
            let name = header::HeaderName::from_bytes(key.as_bytes())?;
            let value = header::HeaderValue::from_str(value)?;
            header_map.insert(name, value);
        }

        self.client = ClientBuilder::new().default_headers(header_map).build()?;

        Ok(self)
    }
}

#[async_trait]
impl Browser for StaticBrowser {
    type Element = HtmlElement;

    fn name(&self) -> &'static str {
        "static"
    }

    async fn navigate(&mut self, url: &Url) -> ScraperResult<()> {
        self.current = None;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::NavigationError {
                url: url.to_string(),
                reason: format!("status {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await?;
        debug!("Received {} bytes from {}", body.len(), final_url);
        self.current = Some((final_url, body));
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> ScraperResult<Vec<HtmlElement>> {
        match &self.current {
            Some((url, body)) => select_all(body, selector, Some(url)),
            None => Ok(Vec::new()),
        }
    }

    async fn close(self) -> ScraperResult<()> {
        info!("Static browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Element;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> Result<(StaticBrowser, MockServer), HttpBrowserError> {
        let server = MockServer::start().await;
        let browser = StaticBrowser::new()?;
        Ok((browser, server))
    }

    #[tokio::test]
    async fn test_navigate_then_find_all() {
        let (mut browser, mock_server) = setup().await.unwrap();

        Mock::given(method("GET"))
            .and(path("/collections/all"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(
                        r#"<div class="item"><span>a</span></div><div class="item"><span>b</span></div>"#,
                    )
                    .insert_header("content-type", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let url = Url::parse(&format!("{}/collections/all?page=1", mock_server.uri())).unwrap();
        browser.navigate(&url).await.unwrap();

        let items = browser.find_all(".item").await.unwrap();
        assert_eq!(items.len(), 2);
        let span = items[1].find("span").await.unwrap().unwrap();
        assert_eq!(span.text().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_error_status_is_navigation_error() {
        let (mut browser, mock_server) = setup().await.unwrap();

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap().join("/missing").unwrap();
        let result = browser.navigate(&url).await;

        assert!(matches!(result, Err(ScraperError::NavigationError { .. })));
        assert!(browser.find_all("div").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_headers() {
        let (browser, mock_server) = setup().await.unwrap();
        let custom_ua = "CatalogBot/1.0";
        let mut browser = browser.with_headers(vec![("user-agent", custom_ua)]).unwrap();

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", custom_ua))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap();
        browser.navigate(&url).await.unwrap();
        assert_eq!(browser.find_all("p").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_headers() {
        let browser = StaticBrowser::new().unwrap();
        let result = browser.with_headers(vec![("invalid\0header", "value")]);
        assert!(result.is_err());
    }
}

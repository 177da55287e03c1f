use crate::ScraperResult;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// A handle to one element of the rendered page.
#[async_trait]
pub trait Element: Send + Sync + Sized {
    /// First descendant matching `selector`, if any.
    async fn find(&self, selector: &str) -> ScraperResult<Option<Self>>;
    async fn attr(&self, name: &str) -> ScraperResult<Option<String>>;
    async fn text(&self) -> ScraperResult<String>;
}

/// The capability set the extraction loop drives.
#[async_trait]
pub trait Browser: Send {
    type Element: Element;

    fn name(&self) -> &'static str;

    async fn navigate(&mut self, url: &Url) -> ScraperResult<()>;

    async fn wait(&mut self, duration: Duration) {
        sleep(duration).await;
    }

    async fn find_all(&mut self, selector: &str) -> ScraperResult<Vec<Self::Element>>;

    /// Releases the underlying session. Called exactly once, on every exit
    /// path of a run.
    async fn close(self) -> ScraperResult<()>;
}

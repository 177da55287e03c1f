use super::browser::Browser;
use super::html_element::{select_all, HtmlElement};
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Everything a `MockBrowser` saw, shared with the test after the browser
/// itself has been consumed by `close`.
#[derive(Debug, Default)]
pub struct MockLog {
    pub visited: RwLock<Vec<Url>>,
    pub waits: RwLock<Vec<Duration>>,
    pub closed: AtomicBool,
}

impl MockLog {
    pub fn visited(&self) -> Vec<String> {
        self.visited.read().iter().map(Url::to_string).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Serves fixture HTML keyed by full URL. Unknown URLs render as an empty
/// page.
#[derive(Clone, Default)]
pub struct MockBrowser {
    pages: Arc<HashMap<String, String>>,
    failing: Arc<HashSet<String>>,
    current: Option<(Url, String)>,
    log: Arc<MockLog>,
}

impl MockBrowser {
    pub fn new<K, V>(pages: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, body)| (url.into(), body.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Navigating to `url` returns a `NavigationError`.
    pub fn with_failure(mut self, url: &str) -> Self {
        let mut failing = (*self.failing).clone();
        failing.insert(url.to_string());
        self.failing = Arc::new(failing);
        self
    }

    pub fn log(&self) -> Arc<MockLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Browser for MockBrowser {
    type Element = HtmlElement;

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn navigate(&mut self, url: &Url) -> ScraperResult<()> {
        self.log.visited.write().push(url.clone());

        if self.failing.contains(url.as_str()) {
            self.current = None;
            return Err(ScraperError::NavigationError {
                url: url.to_string(),
                reason: "mock failure".to_string(),
            });
        }

        self.current = self
            .pages
            .get(url.as_str())
            .map(|body| (url.clone(), body.clone()));
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        self.log.waits.write().push(duration);
    }

    async fn find_all(&mut self, selector: &str) -> ScraperResult<Vec<HtmlElement>> {
        match &self.current {
            Some((url, body)) => select_all(body, selector, Some(url)),
            None => Ok(Vec::new()),
        }
    }

    async fn close(self) -> ScraperResult<()> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

use super::browser::Element;
use crate::{ScraperError, ScraperResult};
use async_trait::async_trait;
use log::{trace, warn};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Attributes a browser hands back as absolute URLs.
const URL_ATTRIBUTES: [&str; 2] = ["src", "href"];

/// An element of a statically parsed document, kept as its outer HTML so it
/// can cross await points.
///
/// Every query re-parses that HTML as a body-level fragment. Table parts and
/// `<option>`s are re-parsed inside a `<table>` / `<select>` so they keep
/// their root. `<html>`, `<body>` and `<head>` children cannot be re-rooted
/// and read as empty, with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    html: String,
    tag: Option<String>,
    base: Option<Url>,
}

impl HtmlElement {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            tag: None,
            base: None,
        }
    }

    /// `src` and `href` values are resolved against `base`.
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    fn from_element(element: ElementRef<'_>, base: Option<&Url>) -> Self {
        Self {
            html: element.html(),
            tag: Some(element.value().name().to_string()),
            base: base.cloned(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    fn resolve(&self, name: &str, value: String) -> String {
        match &self.base {
            Some(base) if !value.is_empty() && URL_ATTRIBUTES.contains(&name) => base
                .join(&value)
                .map(String::from)
                .unwrap_or(value),
            _ => value,
        }
    }

    fn with_root<T>(&self, f: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let fragment = Html::parse_fragment(&self.wrapped());
        let root = fragment
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .skip(1)
            .find(|element| match &self.tag {
                Some(tag) => element.value().name() == tag,
                None => true,
            });

        if root.is_none() {
            warn!(
                "Lost the root of a {} element while re-parsing it",
                self.tag.as_deref().unwrap_or("fragment")
            );
        }
        root.map(f)
    }

    fn wrapped(&self) -> String {
        let (open, close) = match self.tag.as_deref() {
            Some("tr") => ("<table><tbody>", "</tbody></table>"),
            Some("td" | "th") => ("<table><tbody><tr>", "</tr></tbody></table>"),
            Some("thead" | "tbody" | "tfoot" | "caption" | "colgroup") => ("<table>", "</table>"),
            Some("col") => ("<table><colgroup>", "</colgroup></table>"),
            Some("option" | "optgroup") => ("<select>", "</select>"),
            _ => return self.html.clone(),
        };
        format!("{}{}{}", open, self.html, close)
    }
}

pub(crate) fn parse_selector(selector: &str) -> ScraperResult<Selector> {
    Selector::parse(selector).map_err(|e| ScraperError::SelectorError {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Every element in `body` matching `selector`, in document order. `base` is
/// the URL the body was served from.
pub fn select_all(
    body: &str,
    selector: &str,
    base: Option<&Url>,
) -> ScraperResult<Vec<HtmlElement>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(body);

    Ok(document
        .select(&selector)
        .map(|element| HtmlElement::from_element(element, base))
        .collect())
}

#[async_trait]
impl Element for HtmlElement {
    async fn find(&self, selector: &str) -> ScraperResult<Option<Self>> {
        let selector = parse_selector(selector)?;
        trace!("Selecting {:?} in fragment of {} bytes", selector, self.html.len());

        let found = self.with_root(|root| {
            root.select(&selector)
                .next()
                .map(|element| HtmlElement::from_element(element, self.base.as_ref()))
        });
        Ok(found.flatten())
    }

    async fn attr(&self, name: &str) -> ScraperResult<Option<String>> {
        let value = self.with_root(|root| root.value().attr(name).map(str::to_string));
        Ok(value.flatten().map(|value| self.resolve(name, value)))
    }

    async fn text(&self) -> ScraperResult<String> {
        Ok(self
            .with_root(|root| root.text().collect::<String>())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"<div class="card"><img class="thumb" src="/a.jpg"><h3 class="title">Blue <b>Train</b></h3></div>"#;

    #[test]
    fn test_select_all_keeps_document_order() {
        let body = r#"<ul><li class="x">1</li><li class="x">2</li><li>no</li><li class="x">3</li></ul>"#;
        let items = select_all(body, "li.x", None).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].html(), r#"<li class="x">3</li>"#);
    }

    #[test]
    fn test_select_all_rejects_bad_selector() {
        assert!(select_all("<p></p>", "p[", None).is_err());
    }

    #[tokio::test]
    async fn test_find_is_scoped_to_element() {
        let card = HtmlElement::new(CARD);
        let image = card.find("img.thumb").await.unwrap().unwrap();
        assert_eq!(image.attr("src").await.unwrap().as_deref(), Some("/a.jpg"));
        assert!(card.find(".price").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_text_concatenates_descendants() {
        let card = HtmlElement::new(CARD);
        let title = card.find(".title").await.unwrap().unwrap();
        assert_eq!(title.text().await.unwrap(), "Blue Train");
    }

    #[tokio::test]
    async fn test_missing_attribute_is_none() {
        let card = HtmlElement::new(CARD);
        assert_eq!(card.attr("data-id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_src_resolved_against_page_url() {
        let body = r#"<div class="card"><img src="//cdn.shop.test/a.jpg" alt="/not-a-url"><a href="../p/1">x</a><img class="rel" src="b.jpg"></div>"#;
        let base = Url::parse("https://shop.test/collections/all?page=2").unwrap();
        let card = select_all(body, ".card", Some(&base)).unwrap().remove(0);

        let image = card.find("img").await.unwrap().unwrap();
        assert_eq!(
            image.attr("src").await.unwrap().as_deref(),
            Some("https://cdn.shop.test/a.jpg")
        );
        assert_eq!(image.attr("alt").await.unwrap().as_deref(), Some("/not-a-url"));

        let link = card.find("a").await.unwrap().unwrap();
        assert_eq!(
            link.attr("href").await.unwrap().as_deref(),
            Some("https://shop.test/p/1")
        );
        let relative = card.find("img.rel").await.unwrap().unwrap();
        assert_eq!(
            relative.attr("src").await.unwrap().as_deref(),
            Some("https://shop.test/collections/b.jpg")
        );
    }

    #[tokio::test]
    async fn test_src_without_base_is_raw() {
        let card = HtmlElement::new(CARD);
        let image = card.find("img").await.unwrap().unwrap();
        assert_eq!(image.attr("src").await.unwrap().as_deref(), Some("/a.jpg"));
    }

    #[tokio::test]
    async fn test_table_rows_keep_their_cells() {
        let body = r#"<table><tr class="product"><td class="name">Blue Train</td><td><img src="/bt.jpg"></td><td class="price">9</td></tr></table>"#;
        let rows = select_all(body, "tr.product", None).unwrap();
        assert_eq!(rows.len(), 1);

        let name = rows[0].find("td.name").await.unwrap().unwrap();
        assert_eq!(name.text().await.unwrap(), "Blue Train");
        let image = rows[0].find("img").await.unwrap().unwrap();
        assert_eq!(image.attr("src").await.unwrap().as_deref(), Some("/bt.jpg"));
        assert_eq!(rows[0].text().await.unwrap(), "Blue Train9");
    }

    #[tokio::test]
    async fn test_option_keeps_its_text() {
        let body = r#"<select><option value="lp" class="fmt">Vinyl</option></select>"#;
        let option = select_all(body, "option.fmt", None).unwrap().remove(0);
        assert_eq!(option.text().await.unwrap(), "Vinyl");
        assert_eq!(option.attr("value").await.unwrap().as_deref(), Some("lp"));
    }
}

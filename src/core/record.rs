use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const DEFAULT_MAX_PAGE: u32 = 17;

/// One product container as found on a listing page.
///
/// Fields that could not be read are empty strings; a record is never
/// dropped because one of its fields is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product-image")]
    pub image_url: String,
    #[serde(rename = "product-name")]
    pub name: String,
    #[serde(rename = "product-price")]
    pub price: String,
}

impl ProductRecord {
    pub fn new(
        image_url: impl Into<String>,
        name: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            name: name.into(),
            price: price.into(),
        }
    }

    pub fn as_row(&self) -> [&str; 3] {
        [self.image_url.as_str(), self.name.as_str(), self.price.as_str()]
    }
}

/// Pages `1..=max_page` of a listing. A zero max page is an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    max_page: u32,
}

impl PageRange {
    pub fn new(max_page: u32) -> Self {
        Self { max_page }
    }

    pub fn max_page(&self) -> u32 {
        self.max_page
    }

    pub fn len(&self) -> usize {
        self.max_page as usize
    }

    pub fn is_empty(&self) -> bool {
        self.max_page == 0
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        1..=self.max_page
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGE)
    }
}

impl IntoIterator for PageRange {
    type Item = u32;
    type IntoIter = RangeInclusive<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages()
    }
}

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Image,
    Name,
    Price,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub pages_visited: usize,
    pub empty_pages: usize,
    pub items_extracted: usize,
    pub missing_fields: BTreeMap<Field, usize>,
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats {
                start_time: Utc::now(),
                end_time: None,
                pages_visited: 0,
                empty_pages: 0,
                items_extracted: 0,
                missing_fields: BTreeMap::new(),
            })),
        }
    }

    pub fn record_page(&self, items: usize) {
        let mut stats = self.stats.write();
        stats.pages_visited += 1;
        if items == 0 {
            stats.empty_pages += 1;
        }
    }

    pub fn record_item(&self) {
        self.stats.write().items_extracted += 1;
    }

    pub fn record_missing(&self, field: Field) {
        *self.stats.write().missing_fields.entry(field).or_insert(0) += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        println!("\nScraping Statistics:");
        println!("===================");
        println!("Duration: {} seconds", duration.num_seconds());
        println!("Pages Visited: {}", stats.pages_visited);
        println!("Empty Pages: {}", stats.empty_pages);
        println!("Items Extracted: {}", stats.items_extracted);

        if !stats.missing_fields.is_empty() {
            println!("\nMissing Fields:");
            for (field, count) in &stats.missing_fields {
                println!("  {:?}: {}", field, count);
            }
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pages_counted() {
        let tracker = StatsTracker::new();
        tracker.record_page(3);
        tracker.record_page(0);
        tracker.record_page(1);

        let stats = tracker.get_stats();
        assert_eq!(stats.pages_visited, 3);
        assert_eq!(stats.empty_pages, 1);
    }

    #[test]
    fn test_missing_fields_per_field() {
        let tracker = StatsTracker::new();
        tracker.record_missing(Field::Image);
        tracker.record_missing(Field::Image);
        tracker.record_missing(Field::Price);
        tracker.finish();

        let stats = tracker.get_stats();
        assert_eq!(stats.missing_fields.get(&Field::Image), Some(&2));
        assert_eq!(stats.missing_fields.get(&Field::Name), None);
        assert_eq!(stats.missing_fields.get(&Field::Price), Some(&1));
        assert!(stats.end_time.is_some());
    }

    #[test]
    fn test_missing_fields_in_column_order() {
        let tracker = StatsTracker::new();
        tracker.record_missing(Field::Price);
        tracker.record_missing(Field::Name);
        tracker.record_missing(Field::Image);
        tracker.record_missing(Field::Price);

        let fields: Vec<(Field, usize)> = tracker
            .get_stats()
            .missing_fields
            .into_iter()
            .collect();
        assert_eq!(
            fields,
            vec![(Field::Image, 1), (Field::Name, 1), (Field::Price, 2)]
        );
    }
}

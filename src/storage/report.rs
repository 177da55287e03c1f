use crate::ScraperResult;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub name: String,
    pub status: SourceStatus,
    pub output: PathBuf,
    pub pages: u32,
    pub count: usize,
    /// Records in the output file before this run overwrote it.
    pub previous_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceReport {
    pub fn success(
        name: impl Into<String>,
        output: impl Into<PathBuf>,
        pages: u32,
        count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            status: SourceStatus::Success,
            output: output.into(),
            pages,
            count,
            previous_count: None,
            error: None,
        }
    }

    pub fn failure(
        name: impl Into<String>,
        output: impl Into<PathBuf>,
        error: impl ToString,
    ) -> Self {
        Self {
            status: SourceStatus::Error,
            error: Some(error.to_string()),
            ..Self::success(name, output, 0, 0)
        }
    }

    pub fn skipped(name: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            status: SourceStatus::Skipped,
            ..Self::success(name, output, 0, 0)
        }
    }

    pub fn with_previous_count(mut self, previous_count: Option<usize>) -> Self {
        self.previous_count = previous_count;
        self
    }

    /// New records minus the ones the output held before, when known.
    pub fn delta(&self) -> Option<i64> {
        self.previous_count
            .map(|previous| self.count as i64 - previous as i64)
    }

    pub fn is_success(&self) -> bool {
        self.status == SourceStatus::Success
    }
}

/// Outcome of one scraping run across all configured sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: None,
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: SourceReport) {
        self.sources.push(source);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.sources.iter().map(|s| s.count).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|s| s.status == SourceStatus::Error)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ScraperResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved run report {} to {}", self.run_id, path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ScraperResult<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

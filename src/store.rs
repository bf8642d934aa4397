use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::DatasetError;
use crate::model::{ComponentRecord, TrainingExample};
use crate::scrape::ScrapeReport;

/// Shape of a source's raw file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLayout {
    /// `[{prompt, completion}, ...]`
    Flat,
    /// `{source, base_url, scraped_at, total, components: [...]}`
    Wrapped,
}

#[derive(Serialize)]
struct WrappedRaw<'a> {
    source: &'a str,
    base_url: &'a str,
    scraped_at: DateTime<Utc>,
    total: usize,
    components: &'a [TrainingExample],
}

#[derive(Serialize)]
struct Summary<'a> {
    source: &'a str,
    scraped_at: DateTime<Utc>,
    attempted: usize,
    total: usize,
    fallbacks: usize,
    not_found: &'a [String],
    failed: &'a [String],
    interrupted: bool,
    components: &'a [ComponentRecord],
}

pub fn write_raw(
    path: &Path,
    source: &str,
    base_url: &str,
    layout: RawLayout,
    examples: &[TrainingExample],
) -> Result<()> {
    let json = match layout {
        RawLayout::Flat => serde_json::to_string_pretty(examples)?,
        RawLayout::Wrapped => serde_json::to_string_pretty(&WrappedRaw {
            source,
            base_url,
            scraped_at: Utc::now(),
            total: examples.len(),
            components: examples,
        })?,
    };
    write_file(path, &json)
}

pub fn write_summary(path: &Path, report: &ScrapeReport) -> Result<()> {
    let summary = Summary {
        source: &report.source,
        scraped_at: Utc::now(),
        attempted: report.attempted,
        total: report.components.len(),
        fallbacks: report.fallbacks(),
        not_found: &report.not_found,
        failed: &report.failed,
        interrupted: report.interrupted,
        components: &report.components,
    };
    write_file(path, &serde_json::to_string_pretty(&summary)?)
}

/// Parse a raw file. A missing file is reported as `DatasetError::RawFileMissing`.
pub fn read_raw(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(DatasetError::RawFileMissing(path.to_path_buf()).into());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Count records in a raw file without validating them.
pub fn count_records(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => map.get("components")?.as_array().map(Vec::len),
        _ => None,
    }
}

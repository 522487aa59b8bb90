//! Snapshot discovery and loading.
//!
//! Reads job postings from `.jsonl` (one object per line) and `.json` (an
//! array of objects) files into a [`Dataset`]. The dataset's schema is the
//! union of keys seen across all objects, the same way a CSV header would
//! define it.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use market_core::error::{AnalyticsError, Result};
use market_core::models::{Column, Dataset, JobPosting};
use serde_json::{Map, Value};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Snapshot files under `path`, sorted by path.
///
/// A file path is returned as-is; a directory is searched recursively for
/// `.json` and `.jsonl` files.
pub fn find_snapshot_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    if !path.exists() {
        warn!("Data path does not exist: {}", path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && snapshot_format(entry.path()).is_some())
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every snapshot file under `path` into one dataset.
///
/// Malformed `.jsonl` lines, non-object rows and rows without a `job_id` are
/// skipped with a warning; a later row repeating a `job_id` is dropped. A
/// `.json` file that does not parse, or any file that cannot be read, fails
/// the whole load.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(AnalyticsError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "data path does not exist"),
        });
    }

    let files = find_snapshot_files(path);
    if files.is_empty() {
        warn!("No snapshot files found in {}", path.display());
    }

    let mut builder = SnapshotBuilder::default();
    for file in &files {
        let content = std::fs::read_to_string(file).map_err(|source| AnalyticsError::FileRead {
            path: file.clone(),
            source,
        })?;

        match snapshot_format(file) {
            Some(SnapshotFormat::JsonLines) => {
                for (idx, line) in content.lines().enumerate() {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(trimmed) {
                        Ok(value) => builder.push(&value, file, idx + 1),
                        Err(e) => warn!(
                            "Skipping malformed line {} of {}: {}",
                            idx + 1,
                            file.display(),
                            e
                        ),
                    }
                }
            }
            // An explicitly named file of unknown extension is read as JSON.
            Some(SnapshotFormat::Json) | None => match serde_json::from_str::<Value>(&content)? {
                Value::Array(rows) => {
                    for (idx, row) in rows.iter().enumerate() {
                        builder.push(row, file, idx + 1);
                    }
                }
                single @ Value::Object(_) => builder.push(&single, file, 1),
                _ => warn!("{} holds neither an array nor an object", file.display()),
            },
        }
    }

    let dataset = builder.finish();
    debug!(
        "Loaded {} postings with {} columns from {} files",
        dataset.len(),
        dataset.columns().count(),
        files.len()
    );
    Ok(dataset)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotFormat {
    Json,
    JsonLines,
}

fn snapshot_format(path: &Path) -> Option<SnapshotFormat> {
    match path.extension()?.to_str()? {
        "json" => Some(SnapshotFormat::Json),
        "jsonl" => Some(SnapshotFormat::JsonLines),
        _ => None,
    }
}

#[derive(Default)]
struct SnapshotBuilder {
    columns: BTreeSet<Column>,
    records: Vec<JobPosting>,
    seen_ids: HashSet<String>,
}

impl SnapshotBuilder {
    fn push(&mut self, value: &Value, file: &Path, row: usize) {
        let Some(obj) = value.as_object() else {
            warn!("Skipping non-object row {} of {}", row, file.display());
            return;
        };
        self.columns.extend(obj.keys().filter_map(|k| Column::from_name(k)));

        let Some(posting) = posting_from_object(obj) else {
            warn!("Skipping row {} of {}: no job_id", row, file.display());
            return;
        };
        if !self.seen_ids.insert(posting.job_id.clone()) {
            debug!("Skipping duplicate job {} in {}", posting.job_id, file.display());
            return;
        }
        self.records.push(posting);
    }

    fn finish(self) -> Dataset {
        Dataset::with_columns(self.columns, self.records)
    }
}

/// Convert one snapshot row into a posting; `None` without a usable `job_id`.
fn posting_from_object(obj: &Map<String, Value>) -> Option<JobPosting> {
    let text = |column: Column| text_cell(obj.get(column.name()));
    let number = |column: Column| number_cell(obj.get(column.name()));

    Some(JobPosting {
        job_id: text(Column::JobId)?,
        title: text(Column::Title),
        company: text(Column::Company),
        location: text(Column::Location),
        salary_min: number(Column::SalaryMin),
        salary_max: number(Column::SalaryMax),
        skills: text(Column::Skills),
        experience: text(Column::Experience),
        posted_date: text(Column::PostedDate),
    })
}

/// Strings, numbers and booleans become text; blank strings are empty cells.
fn text_cell(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings (`"85000"`, `" 1.5e5 "`) become numbers.
fn number_cell(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! CSV merge store with atomic rewrite.
//!
//! One store file per ingestion mode. Every run reads the full table,
//! merges the new batch under a conflict policy, and rewrites the file via
//! a temp file and atomic rename, so a crash mid-write can never truncate
//! history. A JSON metadata sidecar records row count, date range, and a
//! content hash; it is informational and never read on the merge path.

use crate::domain::MergeRow;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structured error types for store operations.
///
/// All of these are fatal for the run: proceeding past an unreadable store
/// would silently drop history on the next write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file {path} is unreadable: {detail}")]
    Unreadable { path: String, detail: String },

    #[error("store file {path} is corrupt: {detail}")]
    Corrupt { path: String, detail: String },

    #[error("failed to write store file {path}: {detail}")]
    Write { path: String, detail: String },
}

/// How rows sharing a `(date, key)` are resolved during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Later occurrence wins — a fresh run's value for an already-seen date
    /// overwrites the old one. Scoring mode.
    KeepLast,
    /// Highest score wins, regardless of which seed term produced the row.
    /// Output is ordered by score descending. Discovery mode.
    KeepHighestScore,
}

/// Metadata sidecar for a store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub row_count: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub data_hash: String,
    pub written_at: chrono::NaiveDateTime,
}

/// Merge existing and incoming rows under the given policy.
///
/// Existing rows come first, incoming rows are appended, then duplicates
/// by `(date, key)` are resolved. Exposed separately from the store so the
/// policies can be tested without touching disk.
pub fn merge_rows<R: MergeRow>(existing: Vec<R>, incoming: Vec<R>, policy: MergePolicy) -> Vec<R> {
    match policy {
        MergePolicy::KeepLast => {
            // Survivors keep the position of their last occurrence.
            let mut slots: Vec<Option<R>> = Vec::with_capacity(existing.len() + incoming.len());
            let mut index: HashMap<(NaiveDate, String), usize> = HashMap::new();
            for row in existing.into_iter().chain(incoming) {
                let key = (row.date(), row.key().to_string());
                if let Some(&prev) = index.get(&key) {
                    slots[prev] = None;
                }
                index.insert(key, slots.len());
                slots.push(Some(row));
            }
            slots.into_iter().flatten().collect()
        }
        MergePolicy::KeepHighestScore => {
            let mut all = existing;
            all.extend(incoming);
            // Stable sort by score descending, then first occurrence wins.
            all.sort_by(|a, b| {
                b.score()
                    .partial_cmp(&a.score())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut seen: HashSet<(NaiveDate, String)> = HashSet::new();
            all.into_iter()
                .filter(|row| seen.insert((row.date(), row.key().to_string())))
                .collect()
        }
    }
}

/// The persisted store for one ingestion mode.
pub struct CsvStore<R> {
    path: PathBuf,
    _row: PhantomData<R>,
}

impl<R: MergeRow + Serialize + DeserializeOwned> CsvStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _row: PhantomData,
        }
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Path to the metadata sidecar: `{store}.meta.json`.
    fn meta_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    /// Load all persisted rows.
    ///
    /// A missing file is an empty store (first run). An unreadable file or
    /// one whose header or records don't match the row shape is surfaced as
    /// an error, never treated as empty.
    pub fn load(&self) -> Result<Vec<R>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::Unreadable {
            path: self.path.display().to_string(),
            detail: e.to_string(),
        })?;

        let mut reader = csv::Reader::from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| self.corrupt(e.to_string()))?
            .clone();
        let expected = R::COLUMNS;
        if headers.iter().collect::<Vec<_>>() != expected {
            return Err(self.corrupt(format!(
                "unexpected header [{}], expected [{}]",
                headers.iter().collect::<Vec<_>>().join(","),
                expected.join(",")
            )));
        }

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: R = record.map_err(|e| self.corrupt(e.to_string()))?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rewrite the store with the given rows.
    ///
    /// Writes to `{store}.tmp` and renames into place, then refreshes the
    /// metadata sidecar.
    pub fn persist(&self, rows: &[R]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_err(e.to_string()))?;
            }
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| self.write_err(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| self.write_err(e.to_string()))?;

        let tmp_path = self.path.with_extension("csv.tmp");
        fs::write(&tmp_path, &bytes).map_err(|e| self.write_err(e.to_string()))?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.write_err(format!("atomic rename failed: {e}"))
        })?;

        let meta = StoreMeta {
            row_count: rows.len(),
            start_date: rows.iter().map(|r| r.date()).min(),
            end_date: rows.iter().map(|r| r.date()).max(),
            data_hash: blake3::hash(&bytes).to_hex().to_string(),
            written_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| self.write_err(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(), meta_json)
            .map_err(|e| self.write_err(format!("meta write: {e}")))?;

        Ok(())
    }

    /// Merge a new batch into the store and rewrite it.
    ///
    /// An empty batch leaves the file untouched (no file is created if none
    /// existed) and returns the current contents.
    pub fn merge_and_persist(
        &self,
        new_rows: Vec<R>,
        policy: MergePolicy,
    ) -> Result<Vec<R>, StoreError> {
        let existing = self.load()?;
        if new_rows.is_empty() {
            return Ok(existing);
        }
        let merged = merge_rows(existing, new_rows, policy);
        self.persist(&merged)?;
        Ok(merged)
    }

    /// Read the metadata sidecar, if present and parseable.
    pub fn meta(&self) -> Option<StoreMeta> {
        let content = fs::read_to_string(self.meta_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn corrupt(&self, detail: String) -> StoreError {
        StoreError::Corrupt {
            path: self.path.display().to_string(),
            detail,
        }
    }

    fn write_err(&self, detail: String) -> StoreError {
        StoreError::Write {
            path: self.path.display().to_string(),
            detail,
        }
    }
}

//! Watermark persistence.
//!
//! The watermark is the ID of the last direct message event the bot has
//! fully processed. It is the only durable state the bot keeps.
//!
//! # File Format
//!
//! Stored as `<state_dir>/watermark.json`:
//!
//! ```text
//! { "schema_version": 1, "saved_at": "...", "last_processed_id": "1234" }
//! ```
//!
//! # Atomic Writes
//!
//! Saves use the write-to-temp-then-rename pattern:
//! 1. Write to `watermark.json.tmp`
//! 2. fsync the file
//! 3. Rename to `watermark.json`
//! 4. fsync the directory
//!
//! A reader sees either the old record or the new one, never a partial write.
//! There is no versioning: the last writer wins.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::EventId;

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

/// File name of the watermark record inside the state directory.
pub const WATERMARK_FILE: &str = "watermark.json";

/// Errors that can occur while loading or saving the watermark.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema version mismatch.
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },

    /// Backend-specific failure (used by non-file stores).
    #[error("watermark store error: {0}")]
    Backend(String),
}

/// Result type for watermark operations.
pub type Result<T> = std::result::Result<T, WatermarkError>;

/// Durable storage for the single watermark record.
///
/// `load` returns the empty ID when nothing has been saved yet; that is not
/// an error.
pub trait WatermarkStore {
    /// Reads the last processed event ID.
    fn load(&self) -> impl Future<Output = Result<EventId>> + Send;

    /// Overwrites the stored watermark.
    fn save(&self, watermark: &EventId) -> impl Future<Output = Result<()>> + Send;
}

/// The on-disk watermark record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedWatermark {
    /// Schema version for forward-compatible migrations.
    pub schema_version: u32,

    /// When this record was written.
    pub saved_at: DateTime<Utc>,

    /// The last fully processed event ID. May be empty.
    pub last_processed_id: EventId,
}

impl PersistedWatermark {
    pub fn new(last_processed_id: EventId) -> Self {
        PersistedWatermark {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            last_processed_id,
        }
    }
}

/// A watermark store backed by a JSON file in a state directory.
#[derive(Debug, Clone)]
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    /// Creates a store that keeps its record in `state_dir`.
    ///
    /// The directory is created on first save.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        FileWatermarkStore {
            path: state_dir.as_ref().join(WATERMARK_FILE),
        }
    }

    /// Returns the path of the watermark file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WatermarkStore for FileWatermarkStore {
    async fn load(&self) -> Result<EventId> {
        Ok(try_load_watermark(&self.path)?
            .map(|record| record.last_processed_id)
            .unwrap_or_default())
    }

    async fn save(&self, watermark: &EventId) -> Result<()> {
        save_watermark_atomic(&self.path, &PersistedWatermark::new(watermark.clone()))
    }
}

/// Saves a watermark record atomically to disk.
///
/// # Errors
///
/// Returns an error if any IO operation fails.
pub fn save_watermark_atomic(path: &Path, record: &PersistedWatermark) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(record)?;

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)?;

    // The rename is only durable once the directory entry is synced.
    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// Loads a watermark record from disk.
///
/// # Errors
///
/// Returns an error if:
/// - The file doesn't exist or can't be read
/// - The JSON is malformed
/// - The schema version is incompatible
pub fn load_watermark(path: &Path) -> Result<PersistedWatermark> {
    let bytes = std::fs::read(path)?;
    let record: PersistedWatermark = serde_json::from_slice(&bytes)?;

    if record.schema_version != SCHEMA_VERSION {
        return Err(WatermarkError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            got: record.schema_version,
        });
    }

    Ok(record)
}

/// Attempts to load a watermark record, returning None if the file doesn't exist.
///
/// Other errors (malformed JSON, schema mismatch) are propagated.
pub fn try_load_watermark(path: &Path) -> Result<Option<PersistedWatermark>> {
    match load_watermark(path) {
        Ok(record) => Ok(Some(record)),
        Err(WatermarkError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    File::open(dir_path)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn load_missing_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());

        let watermark = store.load().await.unwrap();
        assert!(watermark.is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());

        store.save(&EventId::new("1234567890123456789012")).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, EventId::new("1234567890123456789012"));
    }

    #[tokio::test]
    async fn save_overwrites_previous_value() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());

        store.save(&EventId::new("100")).await.unwrap();
        store.save(&EventId::new("200")).await.unwrap();

        assert_eq!(store.load().await.unwrap(), EventId::new("200"));
    }

    #[tokio::test]
    async fn saved_empty_value_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());

        store.save(&EventId::empty()).await.unwrap();

        assert!(store.path().exists());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_creates_state_dir() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path().join("nested").join("state"));

        store.save(&EventId::new("7")).await.unwrap();

        assert_eq!(store.load().await.unwrap(), EventId::new("7"));
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());

        store.save(&EventId::new("7")).await.unwrap();

        assert!(!dir.path().join("watermark.json.tmp").exists());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(WatermarkError::Json(_))));
    }

    #[test]
    fn schema_mismatch_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(WATERMARK_FILE);
        let mut record = PersistedWatermark::new(EventId::new("1"));
        record.schema_version = SCHEMA_VERSION + 1;
        std::fs::write(&path, serde_json::to_vec(&record).unwrap()).unwrap();

        let result = load_watermark(&path);
        assert!(matches!(
            result,
            Err(WatermarkError::SchemaMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn fsync_dir_fails_on_nonexistent() {
        let result = fsync_dir(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(result.is_err());
    }
}

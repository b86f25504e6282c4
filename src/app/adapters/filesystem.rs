//! Filesystem persistence for photo documents and night summaries
//!
//! A night directory holds one JSON document per photo plus a
//! `night_summary.json`. Discovery uses `walkdir`; reads and writes go through
//! `tokio::fs`. Documents that cannot be read are logged and skipped so one bad
//! file never blocks a whole night.

use crate::app::models::DetectionEntity;
use crate::app::services::shape_codec::{NightSummary, PhotoDocument, decode_photo_document};
use crate::constants::{NIGHT_SUMMARY_FILENAME, PHOTO_DOCUMENT_EXTENSION};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

// =============================================================================
// Discovery
// =============================================================================

/// Find all photo documents under a night directory, sorted by path
pub fn discover_photo_documents(night_dir: &Path) -> Result<Vec<PathBuf>> {
    if !night_dir.is_dir() {
        return Err(Error::io(
            format!("Night directory does not exist: {}", night_dir.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "Directory not found"),
        ));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(night_dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::directory_traversal(
                    format!("Cannot read night directory {}", night_dir.display()),
                    e,
                ));
            }
            Err(e) => {
                warn!("Error walking night directory {}: {}", night_dir.display(), e);
                continue;
            }
        };

        let path = entry.path();
        let is_document = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == PHOTO_DOCUMENT_EXTENSION);
        let is_summary = path
            .file_name()
            .is_some_and(|name| name == NIGHT_SUMMARY_FILENAME);

        if is_document && !is_summary {
            paths.push(path.to_path_buf());
        }
    }

    debug!(
        "Discovered {} photo documents in {}",
        paths.len(),
        night_dir.display()
    );
    Ok(paths)
}

/// Default night path: the night directory's own name
pub fn default_night_path(night_dir: &Path) -> String {
    night_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| night_dir.display().to_string())
}

// =============================================================================
// Photo Documents
// =============================================================================

/// Read one photo document
///
/// A missing `photoBase` falls back to the file stem.
pub async fn read_photo_document(path: &Path) -> Result<PhotoDocument> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;

    let mut document: PhotoDocument = serde_json::from_str(&contents).map_err(|e| {
        Error::json(
            path.display().to_string(),
            "Invalid photo document",
            Some(e),
        )
    })?;

    if document.photo_base.trim().is_empty() {
        if let Some(stem) = path.file_stem() {
            document.photo_base = stem.to_string_lossy().to_string();
        }
    }
    Ok(document)
}

/// Write a JSON value pretty-printed, replacing the file atomically
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        Error::json(path.display().to_string(), "Failed to serialize", Some(e))
    })?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json)
        .await
        .map_err(|e| Error::io(format!("Failed to write {}", temp_path.display()), e))?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
            warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
        }
        return Err(Error::io(format!("Failed to replace {}", path.display()), e));
    }
    Ok(())
}

/// Write one photo document
pub async fn write_photo_document(path: &Path, document: &PhotoDocument) -> Result<()> {
    write_json(path, document).await?;
    debug!("Wrote {} shapes to {}", document.shapes.len(), path.display());
    Ok(())
}

/// A photo document together with where it was read from
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub document: PhotoDocument,
}

impl LoadedDocument {
    pub fn detections(&self, night_id: &str) -> Vec<DetectionEntity> {
        decode_photo_document(&self.document, night_id)
    }
}

/// All readable documents of one night
#[derive(Debug, Clone, Default)]
pub struct NightDocuments {
    pub documents: Vec<LoadedDocument>,
    /// Documents that could not be read or parsed
    pub skipped: Vec<PathBuf>,
}

impl NightDocuments {
    /// Decode every detection of the night, in document order
    pub fn detections(&self, night_id: &str) -> Vec<DetectionEntity> {
        self.documents
            .iter()
            .flat_map(|loaded| loaded.detections(night_id))
            .collect()
    }

    pub fn find_by_photo(&self, photo_base: &str) -> Option<&LoadedDocument> {
        self.documents
            .iter()
            .find(|loaded| loaded.document.photo_base == photo_base)
    }
}

/// Load every photo document of a night, skipping unreadable ones
pub async fn load_night(night_dir: &Path) -> Result<NightDocuments> {
    let mut night = NightDocuments::default();

    for path in discover_photo_documents(night_dir)? {
        match read_photo_document(&path).await {
            Ok(document) => night.documents.push(LoadedDocument { path, document }),
            Err(e) => {
                warn!("Skipping unreadable document: {}", e);
                night.skipped.push(path);
            }
        }
    }

    info!(
        "Loaded {} photo documents from {} ({} skipped)",
        night.documents.len(),
        night_dir.display(),
        night.skipped.len()
    );
    Ok(night)
}

// =============================================================================
// Night Summary
// =============================================================================

pub fn night_summary_path(night_dir: &Path) -> PathBuf {
    night_dir.join(NIGHT_SUMMARY_FILENAME)
}

pub async fn write_night_summary(night_dir: &Path, summary: &NightSummary) -> Result<()> {
    let path = night_summary_path(night_dir);
    write_json(&path, summary).await?;
    debug!("Wrote night summary to {}", path.display());
    Ok(())
}

/// Read the night summary, `None` when it has not been written yet
pub async fn read_night_summary(night_dir: &Path) -> Result<Option<NightSummary>> {
    let path = night_summary_path(night_dir);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(None);
    }

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
    let summary = serde_json::from_str(&contents).map_err(|e| {
        Error::json(path.display().to_string(), "Invalid night summary", Some(e))
    })?;
    Ok(Some(summary))
}

// =============================================================================
// Write-behind Document Writer
// =============================================================================

/// A document queued for writing
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub path: PathBuf,
    pub document: PhotoDocument,
}

/// Outcome of a document writer task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: usize,
    pub failed: usize,
}

/// Spawn a task that writes queued documents until every sender is dropped
///
/// Failed writes are logged and counted; they do not stop the writer.
pub fn spawn_document_writer() -> (mpsc::UnboundedSender<PendingWrite>, JoinHandle<WriteStats>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<PendingWrite>();

    let handle = tokio::spawn(async move {
        let mut stats = WriteStats::default();
        while let Some(pending) = rx.recv().await {
            match write_photo_document(&pending.path, &pending.document).await {
                Ok(()) => stats.written += 1,
                Err(e) => {
                    warn!("Failed to write {}: {}", pending.path.display(), e);
                    stats.failed += 1;
                }
            }
        }
        stats
    });

    (tx, handle)
}

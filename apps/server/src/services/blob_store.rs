//! Local blob storage for uploaded images.
//!
//! Blobs live flat under one directory, named by a generated token so the
//! client's filename never reaches the filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Outcome of a best-effort blob deletion. Never surfaced as a request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobDeletion {
    /// The file existed and was removed.
    Deleted,
    /// Nothing to remove; an earlier delete or a legacy row.
    NotFoundOnDisk,
    /// Removal failed; the reason has already been logged.
    Failed(String),
}

/// Directory-backed blob store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a collision-resistant blob name keeping the (lower-cased) extension.
    pub fn generate_name(extension: Option<&str>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        match extension.map(str::to_lowercase) {
            Some(ext) if !ext.is_empty() => format!("{}.{}", token, ext),
            _ => token,
        }
    }

    /// Extension of a client-supplied filename, lower-cased.
    ///
    /// Only plain ASCII alphanumeric extensions are kept; anything else is dropped
    /// so the stored name stays deletable through `path_for`.
    pub fn extension_of(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_lowercase)
    }

    /// Resolve a stored name to its path, refusing anything that could escape the root.
    pub fn path_for(&self, stored_name: &str) -> Option<PathBuf> {
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name.contains("..")
        {
            return None;
        }
        Some(self.root.join(stored_name))
    }

    /// Check whether a blob is present on disk.
    pub async fn exists(&self, stored_name: &str) -> bool {
        match self.path_for(stored_name) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Write `data` under a freshly generated name and return that name.
    pub async fn put(&self, data: &[u8], extension: Option<&str>) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let stored_name = Self::generate_name(extension);
        let path = self.path_for(&stored_name).ok_or_else(|| {
            AppError::Storage(format!("Refusing to write blob with unsafe name: {:?}", stored_name))
        })?;

        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write blob {}: {}", path.display(), e))
        })?;

        debug!("Blob written: {} ({} bytes)", stored_name, data.len());

        Ok(stored_name)
    }

    /// Remove a blob if present. Failures are logged, never returned as errors.
    pub async fn delete(&self, stored_name: &str) -> BlobDeletion {
        let Some(path) = self.path_for(stored_name) else {
            warn!("Refusing to delete blob with unsafe name: {:?}", stored_name);
            return BlobDeletion::Failed(format!("unsafe blob name: {}", stored_name));
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Blob deleted: {}", stored_name);
                BlobDeletion::Deleted
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BlobDeletion::NotFoundOnDisk,
            Err(e) => {
                warn!("Failed to delete blob {}: {}", path.display(), e);
                BlobDeletion::Failed(e.to_string())
            }
        }
    }
}

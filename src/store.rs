//! Cache artifact storage
//!
//! Artifacts become visible only through a rename of a fully written,
//! fsynced temporary file in the destination shard directory. Readers never
//! observe a partial thumbnail, and concurrent writers of the same key all
//! converge on complete content.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::error::{Result, ThumbCacheError};

/// Filesystem store rooted at the cache directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of a cache artifact
    pub fn path_for(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }

    /// Whether the artifact is already published
    pub async fn exists(&self, rel_path: &str) -> bool {
        tokio::fs::metadata(self.path_for(rel_path)).await.is_ok()
    }

    /// Publish artifact bytes under `rel_path`, creating shard directories
    ///
    /// The write is atomic: either the complete artifact appears under its
    /// final name or nothing does.
    pub async fn publish(&self, rel_path: &str, data: Bytes) -> Result<PathBuf> {
        let target = self.path_for(rel_path);
        let write_target = target.clone();
        tokio::task::spawn_blocking(move || write_atomic(&write_target, &data)).await??;
        Ok(target)
    }
}

fn write_atomic(target: &Path, data: &[u8]) -> Result<()> {
    let dir = target.parent().ok_or_else(|| {
        storage_err(
            target,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "cache path has no parent"),
        )
    })?;
    std::fs::create_dir_all(dir).map_err(|e| storage_err(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| storage_err(dir, e))?;
    tmp.write_all(data).map_err(|e| storage_err(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| storage_err(tmp.path(), e))?;
    tmp.persist(target).map_err(|e| storage_err(target, e.error))?;

    // Make the rename itself durable where the filesystem allows it.
    if let Ok(dir_handle) = std::fs::File::open(dir) {
        let _ = dir_handle.sync_all();
    }

    Ok(())
}

fn storage_err(path: &Path, source: std::io::Error) -> ThumbCacheError {
    ThumbCacheError::Storage {
        path: path.to_path_buf(),
        source,
    }
}

//! Blob stores for proxied tiles.
//!
//! [`TileStore`] is a minimal get/put capability so the proxy does not care
//! where blobs live. Blobs are never expired or revalidated.
//!
//! - [`FsTileStore`]: one file per tile in a directory. Only the bytes are
//!   persisted, so hits carry no content type.
//! - [`MemoryTileStore`]: process-local map that keeps content types.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::key::TileKey;

/// A tile's bytes with the content type reported for them, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBlob {
    pub data: Bytes,
    pub content_type: Option<String>,
}

impl TileBlob {
    pub fn new(data: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            data: data.into(),
            content_type,
        }
    }
}

/// Key-value storage for tile blobs.
///
/// Writes to distinct keys never conflict. Concurrent writes to one key are
/// last-write-wins; readers see either the old or the new blob, never a mix.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Fetch a blob, `Ok(None)` when absent.
    async fn get(&self, key: &TileKey) -> Result<Option<TileBlob>, StoreError>;

    /// Store a blob, replacing any existing one.
    async fn put(&self, key: &TileKey, blob: &TileBlob) -> Result<(), StoreError>;
}

// =============================================================================
// Filesystem Store
// =============================================================================

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory of tile files named by [`TileKey`].
///
/// The directory is created on first write. Files are written to a temporary
/// name and renamed into place.
#[derive(Debug, Clone)]
pub struct FsTileStore {
    root: PathBuf,
}

impl FsTileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &TileKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn temp_path_for(&self, key: &TileKey) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), n))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl TileStore for FsTileStore {
    async fn get(&self, key: &TileKey) -> Result<Option<TileBlob>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(TileBlob::new(data, None))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn put(&self, key: &TileKey, blob: &TileBlob) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let temp = self.temp_path_for(key);
        if let Err(e) = tokio::fs::write(&temp, &blob.data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(io_error(&temp, e));
        }

        let path = self.path_for(key);
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(io_error(&path, e));
        }
        Ok(())
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Unbounded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    blobs: RwLock<HashMap<TileKey, TileBlob>>,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl TileStore for MemoryTileStore {
    async fn get(&self, key: &TileKey) -> Result<Option<TileBlob>, StoreError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn put(&self, key: &TileKey, blob: &TileBlob) -> Result<(), StoreError> {
        self.blobs.write().await.insert(key.clone(), blob.clone());
        Ok(())
    }
}

//! Cache-aware origin proxy.
//!
//! ```text
//! CHECK_CACHE ──hit──────────────────────────────▶ serve
//!      │
//!     miss
//!      ▼
//! FETCH_ORIGIN ──ok──▶ persist (best effort) ────▶ serve
//!      │
//!     fail ──────────────────────────────────────▶ OriginUnavailable
//! ```
//!
//! With caching disabled the store is never touched and every request goes
//! to the origin.

use tracing::{debug, warn};

use crate::error::TileError;
use crate::tile::{TileCoord, TileResponse, PNG_CONTENT_TYPE};

use super::key::TileKey;
use super::origin::TileOrigin;
use super::store::{TileBlob, TileStore};

/// Serves tiles from a local store, falling back to a remote origin.
pub struct ProxyService<O: TileOrigin, S: TileStore> {
    origin: O,
    store: S,
    cache_enabled: bool,
}

impl<O: TileOrigin, S: TileStore> ProxyService<O, S> {
    /// Cache-then-proxy service.
    pub fn new(origin: O, store: S) -> Self {
        Self {
            origin,
            store,
            cache_enabled: true,
        }
    }

    /// Enable or disable the local store.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn origin(&self) -> &O {
        &self.origin
    }

    /// Get a tile from the store or the origin.
    ///
    /// A store read failure is logged and treated as a miss. A store write
    /// failure is logged and the fetched bytes are served anyway.
    ///
    /// # Errors
    ///
    /// `TileError::Origin` when the origin fetch fails; nothing is persisted.
    pub async fn get_tile(&self, coord: TileCoord) -> Result<TileResponse, TileError> {
        let key = TileKey::for_tile(coord);

        if self.cache_enabled {
            match self.store.get(&key).await {
                Ok(Some(blob)) => {
                    debug!(tile = %coord, key = %key, "Store hit");
                    return Ok(into_response(blob, true));
                }
                Ok(None) => debug!(tile = %coord, key = %key, "Store miss"),
                Err(e) => warn!(tile = %coord, "Store read failed, fetching from origin: {}", e),
            }
        }

        let blob = self.origin.fetch(coord).await?;

        if self.cache_enabled {
            if let Err(e) = self.store.put(&key, &blob).await {
                warn!(tile = %coord, "Failed to persist tile: {}", e);
            }
        }

        Ok(into_response(blob, false))
    }
}

fn into_response(blob: TileBlob, cache_hit: bool) -> TileResponse {
    TileResponse {
        data: blob.data,
        content_type: blob
            .content_type
            .unwrap_or_else(|| PNG_CONTENT_TYPE.to_string()),
        cache_hit,
    }
}

//! Render service: cache lookup, off-thread rendering, PNG encoding.
//!
//! ```text
//! get_tile(z, x, y)
//!   1. Check zoom range      -> ZoomOutOfRange (404)
//!   2. Check TileCache       -> hit
//!   3. Render on the blocking pool (crop / pad / resample)
//!   4. Encode PNG, cache, return
//! ```
//!
//! Tiles outside the image reuse one pre-encoded transparent PNG and are not
//! cached.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::error::TileError;
use crate::tile::{PngTileEncoder, TileCache, TileCoord, TileResponse, PNG_CONTENT_TYPE};

use super::renderer::{MapGeometry, TilePixels, TileRenderer};

/// Serves encoded tiles rendered from the source image.
pub struct RenderService {
    renderer: Arc<TileRenderer>,

    /// Cache for encoded tiles
    cache: TileCache,

    encoder: PngTileEncoder,

    /// Shared encoding of the fully transparent tile
    transparent: Bytes,
}

impl RenderService {
    /// Create a new render service with the default cache capacity.
    pub fn new(renderer: TileRenderer) -> Result<Self, TileError> {
        Self::with_cache(renderer, TileCache::new())
    }

    /// Create a new render service with a cache of `cache_capacity` bytes.
    pub fn with_cache_capacity(
        renderer: TileRenderer,
        cache_capacity: usize,
    ) -> Result<Self, TileError> {
        Self::with_cache(renderer, TileCache::with_capacity(cache_capacity))
    }

    fn with_cache(renderer: TileRenderer, cache: TileCache) -> Result<Self, TileError> {
        let encoder = PngTileEncoder::new();
        let transparent = encoder.encode_transparent()?;
        Ok(Self {
            renderer: Arc::new(renderer),
            cache,
            encoder,
            transparent,
        })
    }

    pub fn geometry(&self) -> &MapGeometry {
        self.renderer.geometry()
    }

    /// Get an encoded tile, using the cache when available.
    ///
    /// # Errors
    ///
    /// - `ZoomOutOfRange` when `z` is outside `[min_zoom, native_zoom]`
    /// - `EncodeError` if PNG encoding fails
    /// - `Internal` if the render task panics
    pub async fn get_tile(&self, coord: TileCoord) -> Result<TileResponse, TileError> {
        self.renderer.check_zoom(coord.z)?;

        if let Some(data) = self.cache.get(&coord).await {
            debug!(tile = %coord, "Render cache hit");
            return Ok(TileResponse {
                data,
                content_type: PNG_CONTENT_TYPE.to_string(),
                cache_hit: true,
            });
        }

        let renderer = Arc::clone(&self.renderer);
        let encoder = self.encoder.clone();
        let rendered = tokio::task::spawn_blocking(move || -> Result<Option<Bytes>, TileError> {
            match renderer.render(coord)? {
                TilePixels::Transparent => Ok(None),
                TilePixels::Image(img) => encoder.encode(&img).map(Some),
            }
        })
        .await
        .map_err(|e| TileError::Internal {
            message: e.to_string(),
        })??;

        let data = match rendered {
            Some(data) => {
                debug!(tile = %coord, bytes = data.len(), "Rendered tile");
                self.cache.put(coord, data.clone()).await;
                data
            }
            None => {
                debug!(tile = %coord, "Tile outside map, serving transparent");
                self.transparent.clone()
            }
        };

        Ok(TileResponse {
            data,
            content_type: PNG_CONTENT_TYPE.to_string(),
            cache_hit: false,
        })
    }

    /// Get cache statistics as `(size_bytes, capacity_bytes, entry_count)`.
    pub async fn cache_stats(&self) -> (usize, usize, usize) {
        (
            self.cache.size().await,
            self.cache.capacity(),
            self.cache.len().await,
        )
    }
}

//! Tile addressing and the pieces shared by both tile services.
//!
//! # Components
//!
//! - [`TileCoord`]: a `(z, x, y)` slippy-map address
//! - [`TileCache`]: LRU cache for encoded tiles with size-based eviction
//! - [`PngTileEncoder`]: encodes RGBA tiles as PNG
//! - [`TileResponse`]: encoded bytes plus the metadata handlers need
//!
//! # Example
//!
//! ```
//! use maptile_server::tile::{TileCache, TileCoord};
//! use bytes::Bytes;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = TileCache::with_capacity(1024 * 1024);
//!     let coord = TileCoord::new(14, 9903, 5122);
//!
//!     if cache.get(&coord).await.is_none() {
//!         cache.put(coord, Bytes::from_static(b"\x89PNG")).await;
//!     }
//!     assert!(cache.contains(&coord).await);
//! }
//! ```

use std::fmt;

use bytes::Bytes;

mod cache;
mod encoder;

pub use cache::{TileCache, DEFAULT_TILE_CACHE_CAPACITY};
pub use encoder::{PngTileEncoder, PNG_CONTENT_TYPE};

pub use crate::geo::TILE_SIZE;

/// Address of a tile in the slippy-map scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,

    /// Column, 0 at longitude -180
    pub x: u32,

    /// Row, 0 at the northern edge
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Encoded tile ready to be written to the wire.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// Encoded image bytes
    pub data: Bytes,

    /// MIME type of `data`
    pub content_type: String,

    /// Whether the bytes came from a cache rather than being produced now
    pub cache_hit: bool,
}

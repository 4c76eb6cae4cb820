//! Origin cache proxy.
//!
//! Serves tiles from a remote provider through a local blob store.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              ProxyService               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileStore   │  │   TileOrigin    │  │
//! │  │ (fs / memory)│  │ (HTTP, reqwest) │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use maptile_server::proxy::{MemoryTileStore, TileBlob, TileKey, TileStore};
//! use maptile_server::tile::TileCoord;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryTileStore::new();
//!     let key = TileKey::for_tile(TileCoord::new(12, 2475, 1280));
//!     assert_eq!(key.as_str(), "12_2475_1280.png");
//!
//!     store.put(&key, &TileBlob::new(vec![0x89, b'P'], None)).await.unwrap();
//!     assert!(store.get(&key).await.unwrap().is_some());
//! }
//! ```

pub(crate) mod key;
mod origin;
mod service;
mod store;

pub use key::TileKey;
pub use origin::{
    HttpOrigin, OriginConfig, TileOrigin, DEFAULT_ORIGIN_ACCEPT, DEFAULT_ORIGIN_ACCEPT_LANGUAGE,
    DEFAULT_ORIGIN_COOKIE, DEFAULT_ORIGIN_REFERER, DEFAULT_ORIGIN_TIMEOUT_SECS, DEFAULT_ORIGIN_URL,
    DEFAULT_ORIGIN_USER_AGENT,
};
pub use service::ProxyService;
pub use store::{FsTileStore, MemoryTileStore, TileBlob, TileStore};

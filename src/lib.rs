//! # maptile-server
//!
//! Slippy-map tile services for a single city map.
//!
//! Two independent subsystems answer `GET {z}/{x}/{y}.png` requests in the
//! standard Web-Mercator tiling scheme:
//!
//! - **Projection renderer**: places one static raster on the map, infers the
//!   zoom level whose ground resolution matches the image, and cuts 256×256
//!   tiles from it on demand. Tiles that miss the image are transparent.
//! - **Origin cache proxy**: serves tiles from a remote provider through a
//!   local blob store, fetching each tile from the origin at most once.
//!
//! ## Architecture
//!
//! - [`geo`] - Web-Mercator math, world rectangles and zoom calibration
//! - [`tile`] - Tile addressing, PNG encoding and the encoded-tile cache
//! - [`render`] - Source image loading, tile rendering and the render service
//! - [`proxy`] - Store keys, blob stores, the HTTP origin and the proxy service
//! - [`server`] - Axum handlers and routers
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use maptile_server::{build_renderer, create_render_router, MapSettings, RenderService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = MapSettings {
//!         map_file: "map.png".into(),
//!         min_zoom: 10,
//!         center_lat: 55.74876,
//!         center_lon: 37.61573,
//!         real_width_km: 5.0,
//!         real_height_km: None,
//!         native_zoom: None,
//!     };
//!
//!     let (renderer, report) = build_renderer(&settings)?;
//!     println!("{}", report);
//!
//!     let router = create_render_router(RenderService::new(renderer)?, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod proxy;
pub mod render;
pub mod server;
pub mod tile;

// Re-export commonly used types
pub use config::{CalibrateConfig, Cli, Command, MapArgs, ProxyConfig, RenderConfig};
pub use error::{
    CalibrationError, OriginError, RenderSetupError, SourceImageError, StoreError, TileError,
};
pub use geo::{Calibration, CalibrationInput, WorldRect, TILE_SIZE};
pub use proxy::{
    FsTileStore, HttpOrigin, MemoryTileStore, OriginConfig, ProxyService, TileBlob, TileKey,
    TileOrigin, TileStore,
};
pub use render::{
    build_renderer, calibrate, CalibrationReport, MapGeometry, MapSettings, RenderService,
    SourceImage, TileRenderer,
};
pub use server::{
    create_proxy_router, create_render_router, health_handler, ErrorResponse, HealthResponse,
    RouterConfig,
};
pub use tile::{PngTileEncoder, TileCache, TileCoord, TileResponse};

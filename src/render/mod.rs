//! Projection renderer.
//!
//! Serves tiles cut from a single static raster placed on the Web-Mercator
//! grid.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             RenderService               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │ PngTileEncoder  │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   TileRenderer (SourceImage + geometry) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The renderer is built once at startup by [`build_renderer`], which loads
//! the image, calibrates its native zoom and places it on the grid.

mod renderer;
mod service;
mod setup;
mod source;

pub use renderer::{MapGeometry, TilePixels, TileRenderer, MAX_ZOOM_SPAN};
pub use service::RenderService;
pub use setup::{build_renderer, calibrate, CalibrationReport, MapSettings};
pub use source::SourceImage;

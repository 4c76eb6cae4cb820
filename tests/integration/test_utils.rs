//! Test utilities for integration tests.
//!
//! This module provides a mock origin and helpers for building renderers and
//! decoding tile responses.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use bytes::Bytes;
use http_body_util::BodyExt;
use image::{Rgba, RgbaImage};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use maptile_server::error::OriginError;
use maptile_server::geo::WorldRect;
use maptile_server::proxy::{TileBlob, TileOrigin};
use maptile_server::render::{MapGeometry, RenderService, SourceImage, TileRenderer};
use maptile_server::tile::TileCoord;

// =============================================================================
// Mock Origin
// =============================================================================

/// An in-process origin that counts fetches.
///
/// Every tile is served as a small body naming its coordinates, except
/// tiles marked as failing, which return HTTP 502.
#[derive(Clone, Default)]
pub struct MockOrigin {
    fetch_count: Arc<AtomicUsize>,
    failing: Arc<HashSet<TileCoord>>,
    content_type: Option<String>,
}

impl MockOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every fetch of `coord`.
    pub fn with_failing(mut self, coord: TileCoord) -> Self {
        let mut failing = (*self.failing).clone();
        failing.insert(coord);
        self.failing = Arc::new(failing);
        self
    }

    /// Report `content_type` for every tile.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Body the origin serves for `coord`.
    pub fn body_for(coord: TileCoord) -> Bytes {
        Bytes::from(format!("tile {}", coord))
    }
}

#[async_trait]
impl TileOrigin for MockOrigin {
    async fn fetch(&self, coord: TileCoord) -> Result<TileBlob, OriginError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(&coord) {
            return Err(OriginError::Status {
                status: 502,
                url: format!("mock://origin/{}.png", coord),
            });
        }

        Ok(TileBlob::new(
            Self::body_for(coord),
            self.content_type.clone(),
        ))
    }
}

// =============================================================================
// Renderer Fixtures
// =============================================================================

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Render service for a 512x512 red image at native zoom 3, zooms 1-3.
///
/// The image covers world pixels 256..768 on both axes, so at zoom 3 tiles
/// (1..=2, 1..=2) are fully inside it and the rest of the grid is empty.
pub fn red_square_service() -> RenderService {
    let image = RgbaImage::from_pixel(512, 512, RED);
    let geometry = MapGeometry::new(3, 1, WorldRect::new(256.0, 256.0, 768.0, 768.0))
        .expect("valid geometry");
    let renderer = TileRenderer::new(SourceImage::from_image(image), geometry);
    RenderService::new(renderer).expect("render service")
}

// =============================================================================
// Request Helpers
// =============================================================================

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Decode a PNG body into RGBA pixels.
pub fn decode_png(data: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .expect("valid PNG")
        .to_rgba8()
}

/// Whether every pixel is fully transparent.
pub fn is_fully_transparent(image: &RgbaImage) -> bool {
    image.pixels().all(|p| p.0[3] == 0)
}

//! PNG tile encoder.
//!
//! Tiles are always RGBA so that areas outside the mapped region stay
//! transparent when layered over a base map.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::TileError;

use super::TILE_SIZE;

/// MIME type of encoded tiles.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Encodes RGBA buffers as PNG.
#[derive(Debug, Clone, Default)]
pub struct PngTileEncoder {}

impl PngTileEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode an RGBA image as PNG.
    pub fn encode(&self, image: &RgbaImage) -> Result<Bytes, TileError> {
        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| TileError::EncodeError {
                message: e.to_string(),
            })?;
        Ok(Bytes::from(output))
    }

    /// Encode a fully transparent tile.
    pub fn encode_transparent(&self) -> Result<Bytes, TileError> {
        self.encode(&transparent_tile())
    }
}

/// A fully transparent `TILE_SIZE` square.
pub fn transparent_tile() -> RgbaImage {
    RgbaImage::new(TILE_SIZE, TILE_SIZE)
}

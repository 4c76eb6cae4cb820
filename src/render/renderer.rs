//! Projection of tile requests onto the source image.
//!
//! The source image is placed in the world-pixel grid of its native zoom,
//! centred on its geographic center, one source pixel per world pixel. A
//! tile at zoom `z` covers `256 * 2^(native - z)` world pixels per side, so
//! rendering it means cropping that footprint out of the image, padding it
//! with transparency where it hangs over the image edge, and downscaling to
//! 256x256.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{CalibrationError, TileError};
use crate::geo::{
    lat_to_world_y, lon_to_world_x, world_x_to_lon, world_y_to_lat, WorldRect, MAX_NATIVE_ZOOM,
    TILE_SIZE,
};
use crate::tile::TileCoord;

use super::source::SourceImage;

/// Maximum number of zoom levels served below native zoom.
///
/// At six levels the padded footprint is 16384 pixels square.
pub const MAX_ZOOM_SPAN: u8 = 6;

/// Placement of the source image in the world grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MapGeometry {
    /// Zoom at which the image maps 1:1 onto world pixels
    pub native_zoom: u8,

    /// Lowest zoom served
    pub min_zoom: u8,

    /// Image footprint in native-zoom world pixels
    pub map_rect: WorldRect,
}

impl MapGeometry {
    /// Geometry from an explicit rectangle.
    pub fn new(
        native_zoom: u8,
        min_zoom: u8,
        map_rect: WorldRect,
    ) -> Result<Self, CalibrationError> {
        check_native_zoom(native_zoom)?;
        if min_zoom > native_zoom {
            return Err(CalibrationError::MinZoomAboveNative {
                min_zoom,
                native_zoom,
            });
        }
        let span = native_zoom - min_zoom;
        if span > MAX_ZOOM_SPAN {
            return Err(CalibrationError::ZoomSpanTooLarge {
                span,
                max: MAX_ZOOM_SPAN,
            });
        }
        Ok(Self {
            native_zoom,
            min_zoom,
            map_rect,
        })
    }

    /// Geometry of a `width x height` image centred on `(center_lat, center_lon)`.
    pub fn from_center(
        center_lat: f64,
        center_lon: f64,
        width_px: u32,
        height_px: u32,
        native_zoom: u8,
        min_zoom: u8,
    ) -> Result<Self, CalibrationError> {
        check_native_zoom(native_zoom)?;
        let cx = lon_to_world_x(center_lon, native_zoom);
        let cy = lat_to_world_y(center_lat, native_zoom);
        let map_rect = WorldRect::centered(cx, cy, width_px as f64, height_px as f64);
        Self::new(native_zoom, min_zoom, map_rect)
    }

    /// Whether tiles at zoom `z` are served.
    pub fn contains_zoom(&self, z: u32) -> bool {
        z >= self.min_zoom as u32 && z <= self.native_zoom as u32
    }

    /// Native pixels per tile pixel at zoom `z`. Caller checks the range.
    pub fn scale(&self, z: u32) -> u64 {
        1u64 << (self.native_zoom as u32 - z)
    }

    /// Geographic bounds as `(west, south, east, north)` in degrees.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let z = self.native_zoom;
        (
            world_x_to_lon(self.map_rect.left, z),
            world_y_to_lat(self.map_rect.bottom, z),
            world_x_to_lon(self.map_rect.right, z),
            world_y_to_lat(self.map_rect.top, z),
        )
    }
}

fn check_native_zoom(native_zoom: u8) -> Result<(), CalibrationError> {
    if native_zoom > MAX_NATIVE_ZOOM {
        return Err(CalibrationError::ZoomOutOfRange {
            zoom: native_zoom as i64,
            max: MAX_NATIVE_ZOOM,
        });
    }
    Ok(())
}

/// Pixels of a rendered tile.
#[derive(Debug, Clone)]
pub enum TilePixels {
    /// Tile lies entirely outside the image
    Transparent,

    /// Rendered 256x256 RGBA tile
    Image(RgbaImage),
}

impl TilePixels {
    /// Materialize as an image, allocating the transparent case.
    pub fn into_image(self) -> RgbaImage {
        match self {
            TilePixels::Transparent => RgbaImage::new(TILE_SIZE, TILE_SIZE),
            TilePixels::Image(img) => img,
        }
    }
}

/// Renders tiles from an immutable source image and geometry.
#[derive(Debug)]
pub struct TileRenderer {
    source: SourceImage,
    geometry: MapGeometry,
}

impl TileRenderer {
    pub fn new(source: SourceImage, geometry: MapGeometry) -> Self {
        Self { source, geometry }
    }

    pub fn geometry(&self) -> &MapGeometry {
        &self.geometry
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    /// Reject zooms outside `[min_zoom, native_zoom]`.
    pub fn check_zoom(&self, z: u32) -> Result<(), TileError> {
        if self.geometry.contains_zoom(z) {
            Ok(())
        } else {
            Err(TileError::ZoomOutOfRange {
                z,
                min_zoom: self.geometry.min_zoom,
                max_zoom: self.geometry.native_zoom,
            })
        }
    }

    /// Render tile `coord`.
    pub fn render(&self, coord: TileCoord) -> Result<TilePixels, TileError> {
        self.check_zoom(coord.z)?;

        let map_rect = &self.geometry.map_rect;
        let scale = self.geometry.scale(coord.z);
        let tile_rect = WorldRect::tile(coord.x, coord.y, scale);

        if tile_rect.intersect(map_rect).is_none() {
            return Ok(TilePixels::Transparent);
        }

        // Crop and paste share one integer origin
        let origin_x = map_rect.left.floor() as i64;
        let origin_y = map_rect.top.floor() as i64;
        let tile_left = tile_rect.left as i64;
        let tile_top = tile_rect.top as i64;
        let footprint = TILE_SIZE as i64 * scale as i64;

        let (img_w, img_h) = self.source.dimensions();
        let left = (tile_left - origin_x).clamp(0, img_w as i64);
        let top = (tile_top - origin_y).clamp(0, img_h as i64);
        let right = (tile_left + footprint - origin_x).clamp(0, img_w as i64);
        let bottom = (tile_top + footprint - origin_y).clamp(0, img_h as i64);
        if right <= left || bottom <= top {
            return Ok(TilePixels::Transparent);
        }

        let cropped = imageops::crop_imm(
            self.source.image(),
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
        .to_image();

        let full = if (cropped.width() as i64) < footprint || (cropped.height() as i64) < footprint
        {
            let mut canvas = RgbaImage::new(footprint as u32, footprint as u32);
            let offset_x = origin_x + left - tile_left;
            let offset_y = origin_y + top - tile_top;
            imageops::replace(&mut canvas, &cropped, offset_x, offset_y);
            canvas
        } else {
            cropped
        };

        let tile = if scale == 1 {
            full
        } else {
            imageops::resize(&full, TILE_SIZE, TILE_SIZE, FilterType::Lanczos3)
        };

        Ok(TilePixels::Image(tile))
    }
}

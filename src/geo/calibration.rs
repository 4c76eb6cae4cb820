//! Native zoom calibration.
//!
//! Infers the zoom level at which one source pixel maps to one world pixel,
//! from the real-world extent of the image. The X axis is corrected for the
//! latitude of the image center; the Y axis is not.

use tracing::warn;

use crate::error::CalibrationError;

use super::projection::{haversine_km, BASE_RESOLUTION, MAX_LATITUDE, METERS_PER_DEGREE_LAT};

/// Highest native zoom the renderer accepts.
pub const MAX_NATIVE_ZOOM: u8 = 24;

/// Axis estimates further apart than this (in zoom levels) indicate that the
/// declared extents disagree with the image's pixel aspect ratio.
pub const ASPECT_DISTORTION_THRESHOLD: f64 = 1.0;

/// Measurements describing the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationInput {
    /// Image width in pixels
    pub width_px: u32,

    /// Image height in pixels
    pub height_px: u32,

    /// Ground distance covered horizontally, edge to edge
    pub real_width_km: f64,

    /// Ground distance covered vertically, if measured
    pub real_height_km: Option<f64>,

    /// Latitude of the image center in degrees
    pub center_lat: f64,
}

/// Result of calibrating a source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Meters per source pixel along X
    pub mpp_x: f64,

    /// Meters per source pixel along Y, if a height was given
    pub mpp_y: Option<f64>,

    /// Unrounded zoom estimate from the X axis
    pub zoom_x: f64,

    /// Unrounded zoom estimate from the Y axis
    pub zoom_y: Option<f64>,

    /// Rounded zoom estimate, not yet checked against the supported range
    pub zoom_estimate: i64,
}

impl Calibration {
    /// Calibrate from measurements.
    ///
    /// With only a width, the native zoom is the rounded X estimate. With a
    /// height as well, the two estimates are averaged before rounding and a
    /// warning is logged when they differ by more than one zoom level.
    ///
    /// The rounded estimate is kept unchecked so a fixed zoom can still be
    /// reported against it; use [`Calibration::native_zoom`] to validate it.
    pub fn compute(input: &CalibrationInput) -> Result<Self, CalibrationError> {
        validate_input(input)?;

        let mpp_x = input.real_width_km * 1000.0 / input.width_px as f64;
        let ground_mpp_z0_x = BASE_RESOLUTION * input.center_lat.to_radians().cos();
        let zoom_x = (ground_mpp_z0_x / mpp_x).log2();

        let (mpp_y, zoom_y) = match input.real_height_km {
            Some(km) => {
                let mpp_y = km * 1000.0 / input.height_px as f64;
                (Some(mpp_y), Some((BASE_RESOLUTION / mpp_y).log2()))
            }
            None => (None, None),
        };

        let estimate = match zoom_y {
            Some(zy) => (zoom_x + zy) / 2.0,
            None => zoom_x,
        };
        let calibration = Self {
            mpp_x,
            mpp_y,
            zoom_x,
            zoom_y,
            zoom_estimate: estimate.round() as i64,
        };

        if let Some(diff) = calibration.aspect_distortion() {
            warn!(
                zoom_x = calibration.zoom_x,
                zoom_y = ?calibration.zoom_y,
                "Aspect distortion of {:.2} zoom levels between axes; using averaged zoom {}",
                diff,
                calibration.zoom_estimate
            );
        }

        Ok(calibration)
    }

    /// The estimate as a native zoom, if it lies within `0..=MAX_NATIVE_ZOOM`.
    pub fn native_zoom(&self) -> Result<u8, CalibrationError> {
        u8::try_from(self.zoom_estimate)
            .ok()
            .filter(|&z| z <= MAX_NATIVE_ZOOM)
            .ok_or(CalibrationError::ZoomOutOfRange {
                zoom: self.zoom_estimate,
                max: MAX_NATIVE_ZOOM,
            })
    }

    /// Difference between the axis estimates when it exceeds
    /// [`ASPECT_DISTORTION_THRESHOLD`].
    pub fn aspect_distortion(&self) -> Option<f64> {
        let diff = (self.zoom_x - self.zoom_y?).abs();
        (diff > ASPECT_DISTORTION_THRESHOLD).then_some(diff)
    }
}

/// Approximate north-south extent in km of an image `height_px` tall,
/// centred on `(center_lat, center_lon)` and rendered at `zoom`.
///
/// Diagnostic only.
pub fn approx_height_km(center_lat: f64, center_lon: f64, height_px: u32, zoom: u8) -> f64 {
    let half_height_m = height_px as f64 / 2.0 * BASE_RESOLUTION / 2f64.powi(zoom as i32);
    let half_deg = half_height_m / METERS_PER_DEGREE_LAT;
    haversine_km(
        center_lat + half_deg,
        center_lon,
        center_lat - half_deg,
        center_lon,
    )
}

fn validate_input(input: &CalibrationInput) -> Result<(), CalibrationError> {
    if input.width_px == 0 || input.height_px == 0 {
        return Err(CalibrationError::InvalidDimensions {
            width: input.width_px,
            height: input.height_px,
        });
    }
    if !(input.real_width_km.is_finite() && input.real_width_km > 0.0) {
        return Err(CalibrationError::InvalidExtent {
            axis: "x",
            value: input.real_width_km,
        });
    }
    if let Some(km) = input.real_height_km {
        if !(km.is_finite() && km > 0.0) {
            return Err(CalibrationError::InvalidExtent {
                axis: "y",
                value: km,
            });
        }
    }
    if !(input.center_lat.is_finite() && input.center_lat.abs() < MAX_LATITUDE) {
        return Err(CalibrationError::InvalidLatitude(input.center_lat));
    }
    Ok(())
}

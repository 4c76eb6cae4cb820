//! One-time construction of the renderer from map settings.

use std::fmt;
use std::path::PathBuf;

use crate::error::RenderSetupError;
use crate::geo::{approx_height_km, Calibration, CalibrationInput};

use super::renderer::{MapGeometry, TileRenderer};
use super::source::SourceImage;

/// Everything needed to place the source image on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Path of the source raster
    pub map_file: PathBuf,

    /// Lowest zoom served
    pub min_zoom: u8,

    /// Latitude of the image center
    pub center_lat: f64,

    /// Longitude of the image center
    pub center_lon: f64,

    /// Real horizontal extent in km
    pub real_width_km: f64,

    /// Real vertical extent in km, if measured
    pub real_height_km: Option<f64>,

    /// Fixed native zoom; `None` uses the calibrated value
    pub native_zoom: Option<u8>,
}

/// Diagnostic summary of a calibration.
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub width_px: u32,
    pub height_px: u32,
    pub real_width_km: f64,
    pub calibration: Calibration,

    /// Whether the native zoom came from calibration or was fixed
    pub auto_zoom: bool,

    pub geometry: MapGeometry,

    /// Approximate covered height at the native zoom in use
    pub approx_height_km: f64,
}

impl CalibrationReport {
    fn new(
        settings: &MapSettings,
        width_px: u32,
        height_px: u32,
        calibration: Calibration,
        geometry: MapGeometry,
    ) -> Self {
        let approx_height_km = approx_height_km(
            settings.center_lat,
            settings.center_lon,
            height_px,
            geometry.native_zoom,
        );
        Self {
            width_px,
            height_px,
            real_width_km: settings.real_width_km,
            calibration,
            auto_zoom: settings.native_zoom.is_none(),
            geometry,
            approx_height_km,
        }
    }
}

impl fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cal = &self.calibration;
        let rect = &self.geometry.map_rect;
        let (west, south, east, north) = self.geometry.bounds();

        writeln!(f, "Source image: {}x{} px", self.width_px, self.height_px)?;
        match (cal.zoom_y, cal.mpp_y) {
            (Some(zoom_y), Some(mpp_y)) => {
                writeln!(
                    f,
                    "Zoom estimates: x {:.2} ({:.2} m/px), y {:.2} ({:.2} m/px)",
                    cal.zoom_x, cal.mpp_x, zoom_y, mpp_y
                )?;
                if let Some(diff) = cal.aspect_distortion() {
                    writeln!(f, "Aspect distortion: {:.2} zoom levels, averaged", diff)?;
                }
            }
            _ => writeln!(f, "Zoom estimate: x {:.2} ({:.2} m/px)", cal.zoom_x, cal.mpp_x)?,
        }
        writeln!(
            f,
            "Native zoom: {} ({}), serving zooms {}-{}",
            self.geometry.native_zoom,
            if self.auto_zoom { "calibrated" } else { "fixed" },
            self.geometry.min_zoom,
            self.geometry.native_zoom
        )?;
        writeln!(
            f,
            "Map rect (native world px): x {:.0}..{:.0}, y {:.0}..{:.0}",
            rect.left, rect.right, rect.top, rect.bottom
        )?;
        writeln!(
            f,
            "Bounds: W {:.5} S {:.5} E {:.5} N {:.5}",
            west, south, east, north
        )?;
        write!(
            f,
            "Coverage: width {:.2} km, height ~{:.1} km",
            self.real_width_km, self.approx_height_km
        )
    }
}

/// Calibrate `source` and compute its geometry.
pub fn calibrate(
    settings: &MapSettings,
    source: &SourceImage,
) -> Result<CalibrationReport, RenderSetupError> {
    let (width_px, height_px) = source.dimensions();
    let calibration = Calibration::compute(&CalibrationInput {
        width_px,
        height_px,
        real_width_km: settings.real_width_km,
        real_height_km: settings.real_height_km,
        center_lat: settings.center_lat,
    })?;

    let native_zoom = match settings.native_zoom {
        Some(zoom) => zoom,
        None => calibration.native_zoom()?,
    };
    let geometry = MapGeometry::from_center(
        settings.center_lat,
        settings.center_lon,
        width_px,
        height_px,
        native_zoom,
        settings.min_zoom,
    )?;

    Ok(CalibrationReport::new(
        settings,
        width_px,
        height_px,
        calibration,
        geometry,
    ))
}

/// Load the source image and build a renderer for it.
pub fn build_renderer(
    settings: &MapSettings,
) -> Result<(TileRenderer, CalibrationReport), RenderSetupError> {
    let source = SourceImage::open(&settings.map_file)?;
    let report = calibrate(settings, &source)?;
    let renderer = TileRenderer::new(source, report.geometry.clone());
    Ok((renderer, report))
}

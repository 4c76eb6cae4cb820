//! Geographic math shared by the renderer.
//!
//! - [`projection`]: Web-Mercator transforms and projection constants
//! - [`rect`]: world-pixel rectangles and intersection
//! - [`calibration`]: native zoom inference from real-world extents

pub mod calibration;
pub mod projection;
pub mod rect;

pub use calibration::{
    approx_height_km, Calibration, CalibrationInput, ASPECT_DISTORTION_THRESHOLD, MAX_NATIVE_ZOOM,
};
pub use projection::{
    haversine_km, lat_to_world_y, lon_to_world_x, world_size, world_x_to_lon, world_y_to_lat,
    BASE_RESOLUTION, EARTH_RADIUS_KM, MAX_LATITUDE, METERS_PER_DEGREE_LAT, TILE_SIZE,
};
pub use rect::WorldRect;

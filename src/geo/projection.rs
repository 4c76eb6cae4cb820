//! Web-Mercator transforms between geographic and world-pixel coordinates.
//!
//! World coordinates are the global pixel grid at a zoom level, spanning
//! `TILE_SIZE * 2^zoom` on each axis with the origin at the top-left
//! (longitude -180, latitude ~85.05).

use std::f64::consts::PI;

/// Edge length of a tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Ground resolution at zoom 0 on the equator, in meters per pixel.
pub const BASE_RESOLUTION: f64 = 156_543.033_92;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Meters per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Largest latitude representable in Web-Mercator.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Size of the world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE as f64 * 2f64.powi(zoom as i32)
}

/// World X coordinate of a longitude.
pub fn lon_to_world_x(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * world_size(zoom)
}

/// World Y coordinate of a latitude (Y grows southwards).
pub fn lat_to_world_y(lat: f64, zoom: u8) -> f64 {
    let size = world_size(zoom);
    let lat_rad = lat.to_radians();
    size / 2.0 - size / (2.0 * PI) * (PI / 4.0 + lat_rad / 2.0).tan().ln()
}

/// Longitude of a world X coordinate.
pub fn world_x_to_lon(x: f64, zoom: u8) -> f64 {
    x / world_size(zoom) * 360.0 - 180.0
}

/// Latitude of a world Y coordinate.
pub fn world_y_to_lat(y: f64, zoom: u8) -> f64 {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * y / size;
    n.sinh().atan().to_degrees()
}

/// Great-circle distance in kilometres (haversine).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

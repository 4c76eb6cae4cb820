//! Configuration management for the tile services.
//!
//! This module provides the command-line interface, backed by clap:
//! - `render`: serve tiles cut from a single georeferenced image
//! - `proxy`: serve tiles from a remote origin through a local store
//! - `calibrate`: print the calibration report for a map image and exit
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use maptile_server::config::{Cli, Command};
//!
//! match Cli::parse().command {
//!     Command::Render(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Proxy(config) => println!("Origin: {}", config.origin_url),
//!     Command::Calibrate(config) => println!("Map: {}", config.map.map_file.display()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `PORT` - Server port (render: 8000, proxy: 5000)
//! - `MAPTILE_HOST` - Server bind address (default: 0.0.0.0)
//! - `MAPTILE_MAP_FILE` - Source image (default: map.png)
//! - `MAPTILE_MIN_ZOOM` - Lowest zoom served (default: 10)
//! - `MAPTILE_CENTER_LAT` / `MAPTILE_CENTER_LON` - Image center
//! - `MAPTILE_REAL_WIDTH_KM` / `MAPTILE_REAL_HEIGHT_KM` - Real extent
//! - `MAPTILE_NATIVE_ZOOM` - Fixed native zoom, skipping calibration
//! - `MAPTILE_CACHE_TILES` - Rendered tile cache size in bytes (default: 64MB)
//! - `MAPTILE_ORIGIN_URL` - Origin URL template with `{z}`, `{x}`, `{y}`
//! - `MAPTILE_ORIGIN_COOKIE` / `MAPTILE_ORIGIN_REFERER` - Origin request headers
//! - `MAPTILE_ORIGIN_TIMEOUT` - Origin request timeout in seconds (default: 10)
//! - `MAPTILE_CACHE_DIR` - Proxy store directory (default: tile_cache)
//! - `MAPTILE_NO_CACHE` - Proxy without the local store
//! - `MAPTILE_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `MAPTILE_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::geo::{MAX_LATITUDE, MAX_NATIVE_ZOOM};
use crate::proxy::{
    OriginConfig, DEFAULT_ORIGIN_ACCEPT, DEFAULT_ORIGIN_ACCEPT_LANGUAGE, DEFAULT_ORIGIN_COOKIE,
    DEFAULT_ORIGIN_REFERER, DEFAULT_ORIGIN_TIMEOUT_SECS, DEFAULT_ORIGIN_URL,
    DEFAULT_ORIGIN_USER_AGENT,
};
use crate::render::MapSettings;
use crate::server::DEFAULT_CACHE_MAX_AGE;
use crate::tile::DEFAULT_TILE_CACHE_CAPACITY;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default renderer port.
pub const DEFAULT_RENDER_PORT: u16 = 8000;

/// Default proxy port.
pub const DEFAULT_PROXY_PORT: u16 = 5000;

/// Default source image.
pub const DEFAULT_MAP_FILE: &str = "map.png";

/// Default lowest zoom served by the renderer.
pub const DEFAULT_MIN_ZOOM: u8 = 10;

/// Default image center latitude.
pub const DEFAULT_CENTER_LAT: f64 = 55.74876;

/// Default image center longitude.
pub const DEFAULT_CENTER_LON: f64 = 37.61573;

/// Default real-world width of the image in km.
pub const DEFAULT_REAL_WIDTH_KM: f64 = 5.0;

/// Default proxy store directory.
pub const DEFAULT_CACHE_DIR: &str = "tile_cache";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Map tile server.
///
/// Renders slippy-map tiles from a single georeferenced image, or proxies
/// tiles from a remote provider through a local disk cache.
#[derive(Parser, Debug, Clone)]
#[command(name = "maptile-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve tiles rendered from a static map image.
    Render(RenderConfig),

    /// Serve tiles from a remote origin, cached on disk.
    Proxy(ProxyConfig),

    /// Print the calibration report for a map image and exit.
    Calibrate(CalibrateConfig),
}

/// Placement of the source image on the map.
#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    /// Source image file (PNG or JPEG).
    #[arg(long, default_value = DEFAULT_MAP_FILE, env = "MAPTILE_MAP_FILE")]
    pub map_file: PathBuf,

    /// Lowest zoom level served.
    #[arg(long, default_value_t = DEFAULT_MIN_ZOOM, env = "MAPTILE_MIN_ZOOM")]
    pub min_zoom: u8,

    /// Latitude of the image center in degrees.
    #[arg(long, default_value_t = DEFAULT_CENTER_LAT, env = "MAPTILE_CENTER_LAT", allow_hyphen_values = true)]
    pub center_lat: f64,

    /// Longitude of the image center in degrees.
    #[arg(long, default_value_t = DEFAULT_CENTER_LON, env = "MAPTILE_CENTER_LON", allow_hyphen_values = true)]
    pub center_lon: f64,

    /// Real-world width covered by the image in km.
    #[arg(long, default_value_t = DEFAULT_REAL_WIDTH_KM, env = "MAPTILE_REAL_WIDTH_KM")]
    pub real_width_km: f64,

    /// Real-world height covered by the image in km.
    ///
    /// When given, the native zoom averages the horizontal and vertical
    /// estimates.
    #[arg(long, env = "MAPTILE_REAL_HEIGHT_KM")]
    pub real_height_km: Option<f64>,

    /// Fixed native zoom, skipping automatic calibration.
    #[arg(long, env = "MAPTILE_NATIVE_ZOOM")]
    pub native_zoom: Option<u8>,
}

impl MapArgs {
    /// Validate the map placement and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.center_lat.is_finite() || self.center_lat.abs() >= MAX_LATITUDE {
            return Err(format!(
                "center_lat must be within ±{} degrees",
                MAX_LATITUDE
            ));
        }
        if !self.center_lon.is_finite() || self.center_lon.abs() > 180.0 {
            return Err("center_lon must be between -180 and 180".to_string());
        }
        if !(self.real_width_km.is_finite() && self.real_width_km > 0.0) {
            return Err("real_width_km must be greater than 0".to_string());
        }
        if let Some(h) = self.real_height_km {
            if !(h.is_finite() && h > 0.0) {
                return Err("real_height_km must be greater than 0".to_string());
            }
        }
        if self.min_zoom > MAX_NATIVE_ZOOM {
            return Err(format!("min_zoom must be at most {}", MAX_NATIVE_ZOOM));
        }
        if let Some(z) = self.native_zoom {
            if z > MAX_NATIVE_ZOOM {
                return Err(format!("native_zoom must be at most {}", MAX_NATIVE_ZOOM));
            }
        }
        Ok(())
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            map_file: self.map_file.clone(),
            min_zoom: self.min_zoom,
            center_lat: self.center_lat,
            center_lon: self.center_lon,
            real_width_km: self.real_width_km,
            real_height_km: self.real_height_km,
            native_zoom: self.native_zoom,
        }
    }
}

/// Configuration for the `render` command.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MAPTILE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_RENDER_PORT, env = "PORT")]
    pub port: u16,

    #[command(flatten)]
    pub map: MapArgs,

    /// Rendered tile cache size in bytes.
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_CAPACITY, env = "MAPTILE_CACHE_TILES")]
    pub cache_tiles: usize,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "MAPTILE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MAPTILE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl RenderConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.map.validate()?;
        if self.cache_tiles == 0 {
            return Err("cache_tiles must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the `proxy` command.
#[derive(Args, Debug, Clone)]
pub struct ProxyConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MAPTILE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PROXY_PORT, env = "PORT")]
    pub port: u16,

    /// Origin URL template with {z}, {x} and {y} placeholders.
    #[arg(long, default_value = DEFAULT_ORIGIN_URL, env = "MAPTILE_ORIGIN_URL")]
    pub origin_url: String,

    /// Cookie header sent to the origin. Empty to send none.
    #[arg(long, default_value = DEFAULT_ORIGIN_COOKIE, env = "MAPTILE_ORIGIN_COOKIE")]
    pub origin_cookie: String,

    /// Referer header sent to the origin. Empty to send none.
    #[arg(long, default_value = DEFAULT_ORIGIN_REFERER, env = "MAPTILE_ORIGIN_REFERER")]
    pub origin_referer: String,

    /// User-Agent header sent to the origin.
    #[arg(long, default_value = DEFAULT_ORIGIN_USER_AGENT, env = "MAPTILE_ORIGIN_USER_AGENT")]
    pub origin_user_agent: String,

    /// Accept header sent to the origin.
    #[arg(long, default_value = DEFAULT_ORIGIN_ACCEPT, env = "MAPTILE_ORIGIN_ACCEPT")]
    pub origin_accept: String,

    /// Accept-Language header sent to the origin.
    #[arg(long, default_value = DEFAULT_ORIGIN_ACCEPT_LANGUAGE, env = "MAPTILE_ORIGIN_ACCEPT_LANGUAGE")]
    pub origin_accept_language: String,

    /// Origin request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_ORIGIN_TIMEOUT_SECS, env = "MAPTILE_ORIGIN_TIMEOUT")]
    pub origin_timeout: u64,

    /// Directory for cached tiles.
    #[arg(long, default_value = DEFAULT_CACHE_DIR, env = "MAPTILE_CACHE_DIR")]
    pub cache_dir: PathBuf,

    /// Proxy directly without reading or writing the local store.
    #[arg(long, default_value_t = false, env = "MAPTILE_NO_CACHE")]
    pub no_cache: bool,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "MAPTILE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MAPTILE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ProxyConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.origin_timeout == 0 {
            return Err("origin_timeout must be greater than 0".to_string());
        }
        if !self.no_cache && self.cache_dir.as_os_str().is_empty() {
            return Err(
                "cache_dir is required. Set --cache-dir or MAPTILE_CACHE_DIR, or use --no-cache"
                    .to_string(),
            );
        }
        self.origin_config().validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request parameters for the HTTP origin.
    pub fn origin_config(&self) -> OriginConfig {
        OriginConfig {
            url_template: self.origin_url.clone(),
            cookie: non_empty(&self.origin_cookie),
            referer: non_empty(&self.origin_referer),
            user_agent: self.origin_user_agent.clone(),
            accept: self.origin_accept.clone(),
            accept_language: self.origin_accept_language.clone(),
            timeout: Duration::from_secs(self.origin_timeout),
        }
    }
}

/// Configuration for the `calibrate` command.
#[derive(Args, Debug, Clone)]
pub struct CalibrateConfig {
    #[command(flatten)]
    pub map: MapArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

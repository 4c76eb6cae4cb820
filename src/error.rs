use thiserror::Error;

/// Errors raised while fetching a tile from the remote origin
#[derive(Debug, Clone, Error)]
pub enum OriginError {
    /// Origin answered with a non-success status
    #[error("Origin returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Network, TLS or timeout failure
    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Origin URL template produced an invalid URL
    #[error("Invalid origin URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be built from the configured headers
    #[error("Invalid origin client configuration: {0}")]
    Client(String),
}

/// Errors from the local tile blob store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Filesystem read or write failure
    #[error("Store I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

/// Errors loading the source raster at startup
#[derive(Debug, Error)]
pub enum SourceImageError {
    /// File could not be opened or decoded
    #[error("Failed to load source image {path}: {message}")]
    Load { path: String, message: String },

    /// Image has a zero dimension
    #[error("Source image {path} is empty ({width}x{height})")]
    Empty {
        path: String,
        width: u32,
        height: u32,
    },
}

/// Errors in the calibration inputs
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalibrationError {
    /// Real-world extent must be positive and finite
    #[error("Invalid real-world extent for {axis} axis: {value} km")]
    InvalidExtent { axis: &'static str, value: f64 },

    /// Image dimensions must be non-zero
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Latitude must lie strictly inside the Web-Mercator range
    #[error("Invalid center latitude: {0}")]
    InvalidLatitude(f64),

    /// Computed zoom is negative or beyond what the renderer supports
    #[error("Native zoom {zoom} outside supported range 0-{max}")]
    ZoomOutOfRange { zoom: i64, max: u8 },

    /// Minimum zoom is above the native zoom
    #[error("Minimum zoom {min_zoom} is above native zoom {native_zoom}")]
    MinZoomAboveNative { min_zoom: u8, native_zoom: u8 },

    /// Too many zoom levels below native for the padded canvas to stay bounded
    #[error("Zoom span {span} exceeds maximum of {max} levels below native zoom")]
    ZoomSpanTooLarge { span: u8, max: u8 },
}

/// Errors that can occur while serving a tile
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Zoom outside the renderer's configured range
    #[error("Zoom {z} outside range {min_zoom}-{max_zoom}")]
    ZoomOutOfRange { z: u32, min_zoom: u8, max_zoom: u8 },

    /// Path segments could not be parsed as tile coordinates
    #[error("Invalid tile coordinates: {path}")]
    InvalidCoordinates { path: String },

    /// Origin fetch failed
    #[error("Origin unavailable: {0}")]
    Origin(#[from] OriginError),

    /// PNG encoding failed
    #[error("Failed to encode tile: {message}")]
    EncodeError { message: String },

    /// Render task panicked or was cancelled
    #[error("Render task failed: {message}")]
    Internal { message: String },
}

/// Errors building the renderer at startup. All are fatal.
#[derive(Debug, Error)]
pub enum RenderSetupError {
    /// Source image could not be loaded
    #[error(transparent)]
    Source(#[from] SourceImageError),

    /// Calibration or zoom range is invalid
    #[error("Calibration failed: {0}")]
    Calibration(#[from] CalibrationError),
}

//! HTTP request handlers for the tile endpoints.
//!
//! # Endpoints
//!
//! - `GET /{z}/{x}/{y}.png` - Rendered tile from the static map
//! - `GET /tiles/{z}/{x}/{y}.png` - Tile proxied through the local store
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::TileError;
use crate::proxy::key::parse_component;
use crate::proxy::{ProxyService, TileOrigin, TileStore};
use crate::render::RenderService;
use crate::tile::{TileCoord, TileResponse};

/// Default `Cache-Control` max-age in seconds.
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

/// Response header reporting whether the tile came from a cache.
pub const TILE_CACHE_HIT_HEADER: &str = "X-Tile-Cache-Hit";

// =============================================================================
// Application State
// =============================================================================

/// Shared state for the renderer routes.
#[derive(Clone)]
pub struct RenderState {
    pub service: Arc<RenderService>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,
}

impl RenderState {
    pub fn new(service: RenderService) -> Self {
        Self::with_cache_max_age(service, DEFAULT_CACHE_MAX_AGE)
    }

    pub fn with_cache_max_age(service: RenderService, cache_max_age: u32) -> Self {
        Self {
            service: Arc::new(service),
            cache_max_age,
        }
    }
}

/// Shared state for the proxy routes.
pub struct ProxyState<O: TileOrigin, S: TileStore> {
    pub service: Arc<ProxyService<O, S>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,
}

impl<O: TileOrigin, S: TileStore> ProxyState<O, S> {
    pub fn new(service: ProxyService<O, S>) -> Self {
        Self::with_cache_max_age(service, DEFAULT_CACHE_MAX_AGE)
    }

    pub fn with_cache_max_age(service: ProxyService<O, S>, cache_max_age: u32) -> Self {
        Self {
            service: Arc::new(service),
            cache_max_age,
        }
    }
}

impl<O: TileOrigin, S: TileStore> Clone for ProxyState<O, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Extracted from `/{z}/{x}/{filename}` where filename is `{y}` or `{y}.png`.
/// Segments are kept as strings so malformed coordinates map to a tile error
/// instead of the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub z: String,
    pub x: String,
    pub filename: String,
}

impl TilePathParams {
    /// Parse the tile coordinates, stripping any `.png` extension from `y`.
    pub fn coord(&self) -> Result<TileCoord, TileError> {
        let y = self.filename.strip_suffix(".png").unwrap_or(&self.filename);
        match (
            parse_component(&self.z),
            parse_component(&self.x),
            parse_component(y),
        ) {
            (Some(z), Some(x), Some(y)) => Ok(TileCoord::new(z, x, y)),
            _ => Err(TileError::InvalidCoordinates {
                path: format!("{}/{}/{}", self.z, self.x, self.filename),
            }),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "zoom_out_of_range", "origin_unavailable")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TileError to HTTP response.
///
/// Every tile-level failure the client can cause, and every origin failure,
/// is a 404. Encoding and task failures are 500s.
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            TileError::ZoomOutOfRange { .. } => {
                (StatusCode::NOT_FOUND, "zoom_out_of_range", self.to_string())
            }

            TileError::InvalidCoordinates { .. } => {
                (StatusCode::NOT_FOUND, "invalid_tile", self.to_string())
            }

            TileError::Origin(origin_err) => (
                StatusCode::NOT_FOUND,
                "origin_unavailable",
                origin_err.to_string(),
            ),

            TileError::EncodeError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encode_error",
                self.to_string(),
            ),

            TileError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if matches!(self, TileError::Origin(_)) {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Origin fetch failed: {}",
                message
            );
        } else {
            // Out-of-range zooms are routine for map clients
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Tile not found: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle rendered tile requests.
///
/// # Endpoint
///
/// `GET /{z}/{x}/{y}.png`
///
/// # Response
///
/// - `200 OK`: 256×256 PNG, fully transparent when the tile misses the map
/// - `404 Not Found`: zoom outside the configured range, or malformed path
/// - `500 Internal Server Error`: encoding failure
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `X-Tile-Cache-Hit: true|false`
pub async fn render_tile_handler(
    State(state): State<RenderState>,
    Path(params): Path<TilePathParams>,
) -> Result<Response, TileError> {
    let coord = params.coord()?;
    let response = state.service.get_tile(coord).await?;
    tile_response(response, state.cache_max_age)
}

/// Handle proxied tile requests.
///
/// # Endpoint
///
/// `GET /tiles/{z}/{x}/{y}.png`
///
/// # Response
///
/// - `200 OK`: tile bytes with the origin's content type, `image/png` if unknown
/// - `404 Not Found`: malformed path, or the origin fetch failed
///   (`origin_unavailable`, message carries the upstream error)
pub async fn proxy_tile_handler<O, S>(
    State(state): State<ProxyState<O, S>>,
    Path(params): Path<TilePathParams>,
) -> Result<Response, TileError>
where
    O: TileOrigin + 'static,
    S: TileStore + 'static,
{
    let coord = params.coord()?;
    let response = state.service.get_tile(coord).await?;
    tile_response(response, state.cache_max_age)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn tile_response(response: TileResponse, cache_max_age: u32) -> Result<Response, TileError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, response.content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", cache_max_age),
        )
        .header(TILE_CACHE_HIT_HEADER, response.cache_hit.to_string())
        .body(Body::from(response.data))
        .map_err(|e| TileError::Internal {
            message: format!("failed to build response: {}", e),
        })
}

// =============================================================================
// Tests
// =============================================================================

//! Router configuration for the tile services.
//!
//! # Route Structure
//!
//! Renderer:
//!
//! ```text
//! /health                  - Health check
//! /{z}/{x}/{y}.png         - Rendered tile
//! ```
//!
//! Proxy:
//!
//! ```text
//! /health                  - Health check
//! /tiles/{z}/{x}/{y}.png   - Proxied tile
//! ```
//!
//! # Example
//!
//! ```ignore
//! use maptile_server::proxy::{FsTileStore, HttpOrigin, OriginConfig, ProxyService};
//! use maptile_server::server::{create_proxy_router, RouterConfig};
//!
//! let origin = HttpOrigin::new(OriginConfig::default())?;
//! let service = ProxyService::new(origin, FsTileStore::new("tile_cache"));
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_proxy_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, proxy_tile_handler, render_tile_handler, ProxyState, RenderState,
    DEFAULT_CACHE_MAX_AGE,
};
use crate::proxy::{ProxyService, TileOrigin, TileStore};
use crate::render::RenderService;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builders
// =============================================================================

/// Create the router for the projection renderer.
pub fn create_render_router(service: RenderService, config: RouterConfig) -> Router {
    let state = RenderState::with_cache_max_age(service, config.cache_max_age);

    // {filename} captures both "{y}" and "{y}.png"
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{z}/{x}/{filename}", get(render_tile_handler))
        .with_state(state);

    finish(router, &config)
}

/// Create the router for the origin cache proxy.
pub fn create_proxy_router<O, S>(service: ProxyService<O, S>, config: RouterConfig) -> Router
where
    O: TileOrigin + 'static,
    S: TileStore + 'static,
{
    let state = ProxyState::with_cache_max_age(service, config.cache_max_age);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/tiles/{z}/{x}/{filename}", get(proxy_tile_handler::<O, S>))
        .with_state(state);

    finish(router, &config)
}

fn finish(router: Router, config: &RouterConfig) -> Router {
    let router = router.layer(build_cors_layer(config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │      GET /{z}/{x}/{y}.png        GET /tiles/{z}/{x}/{y}.png     │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (requests, error bodies) │  │ (router config, CORS, trace)│  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, proxy_tile_handler, render_tile_handler, ErrorResponse, HealthResponse,
    ProxyState, RenderState, TilePathParams, DEFAULT_CACHE_MAX_AGE, TILE_CACHE_HIT_HEADER,
};
pub use routes::{create_proxy_router, create_render_router, RouterConfig};

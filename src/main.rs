//! maptile-server - slippy-map tiles from a static image or a cached origin.
//!
//! This binary starts the selected HTTP service and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maptile_server::{
    config::{CalibrateConfig, Cli, Command, ProxyConfig, RenderConfig},
    proxy::{FsTileStore, HttpOrigin, ProxyService},
    render::{build_renderer, calibrate, RenderService, SourceImage},
    server::{create_proxy_router, create_render_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Render(config) => run_render(config).await,
        Command::Proxy(config) => run_proxy(config).await,
        Command::Calibrate(config) => run_calibrate(config),
    }
}

// =============================================================================
// Render Command
// =============================================================================

async fn run_render(config: RenderConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("maptile-server v{} (renderer)", env!("CARGO_PKG_VERSION"));
    info!("Loading map image {}", config.map.map_file.display());

    let (renderer, report) = match build_renderer(&config.map.map_settings()) {
        Ok(built) => built,
        Err(e) => {
            error!("Failed to prepare renderer: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Calibration:");
    for line in report.to_string().lines() {
        info!("  {}", line);
    }
    info!("  Tile cache: {}MB", config.cache_tiles / (1024 * 1024));

    let service = match RenderService::with_cache_capacity(renderer, config.cache_tiles) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to create render service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router = create_render_router(
        service,
        router_config(
            config.cache_max_age,
            config.cors_origins.as_ref(),
            config.no_tracing,
        ),
    );

    let addr = config.bind_address();
    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -o tile.png http://{}/{}/0/0.png",
        addr, report.geometry.native_zoom
    );
    info!("");

    serve(&addr, router).await
}

// =============================================================================
// Proxy Command
// =============================================================================

async fn run_proxy(config: ProxyConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("maptile-server v{} (proxy)", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Origin: {}", config.origin_url);
    info!("  Origin timeout: {}s", config.origin_timeout);
    if config.no_cache {
        info!("  Cache: disabled, every request goes to the origin");
    } else {
        info!("  Cache directory: {}", config.cache_dir.display());
    }

    let origin = match HttpOrigin::new(config.origin_config()) {
        Ok(origin) => origin,
        Err(e) => {
            error!("Failed to create origin client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = FsTileStore::new(&config.cache_dir);
    let service = ProxyService::new(origin, store).with_cache_enabled(!config.no_cache);

    let router = create_proxy_router(
        service,
        router_config(
            config.cache_max_age,
            config.cors_origins.as_ref(),
            config.no_tracing,
        ),
    );

    let addr = config.bind_address();
    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/health", addr);
    info!("    curl -o tile.png http://{}/tiles/12/2475/1280.png", addr);
    info!("");

    serve(&addr, router).await
}

// =============================================================================
// Calibrate Command
// =============================================================================

fn run_calibrate(config: CalibrateConfig) -> ExitCode {
    // Aspect distortion warnings go to the log
    init_logging(config.verbose);

    if let Err(e) = config.map.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let settings = config.map.map_settings();
    let source = match SourceImage::open(&settings.map_file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match calibrate(&settings, &source) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Shared
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "maptile_server=debug,tower_http=debug"
    } else {
        "maptile_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn router_config(
    cache_max_age: u32,
    cors_origins: Option<&Vec<String>>,
    no_tracing: bool,
) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(cache_max_age)
        .with_tracing(!no_tracing);

    if let Some(origins) = cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

async fn serve(addr: &str, router: axum::Router) -> ExitCode {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

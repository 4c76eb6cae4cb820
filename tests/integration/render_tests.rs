//! Renderer integration tests.
//!
//! Tests verify:
//! - Tiles inside, partly inside and outside the map
//! - Zoom range enforcement and malformed paths
//! - Response headers and the rendered tile cache
//! - A map loaded and calibrated from a PNG on disk

use axum::http::StatusCode;
use image::{Rgba, RgbaImage};
use tower::ServiceExt;

use maptile_server::geo::{lat_to_world_y, lon_to_world_x};
use maptile_server::render::{build_renderer, MapSettings, RenderService};
use maptile_server::{create_render_router, RouterConfig};

use super::test_utils::{
    body_bytes, body_json, decode_png, get, is_fully_transparent, red_square_service, RED,
};

fn router() -> axum::Router {
    create_render_router(red_square_service(), RouterConfig::new())
}

// =============================================================================
// Tile Rendering
// =============================================================================

#[tokio::test]
async fn test_tile_inside_map() {
    let response = router().oneshot(get("/3/1/1.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert!(response.headers().contains_key("cache-control"));

    let tile = decode_png(&body_bytes(response).await);
    assert_eq!(tile.dimensions(), (256, 256));
    assert!(tile.pixels().all(|p| *p == RED));
}

#[tokio::test]
async fn test_tile_outside_map_is_transparent() {
    // Zoom 3 grid is 8x8; the map only covers tiles 1..=2 on each axis
    for uri in ["/3/0/0.png", "/3/7/7.png", "/3/3/1.png", "/2/3/0.png"] {
        let response = router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let tile = decode_png(&body_bytes(response).await);
        assert_eq!(tile.dimensions(), (256, 256));
        assert!(is_fully_transparent(&tile), "{} should be transparent", uri);
    }
}

#[tokio::test]
async fn test_tile_beyond_world_grid_is_transparent() {
    let response = router().oneshot(get("/3/4000/4000.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(is_fully_transparent(&decode_png(
        &body_bytes(response).await
    )));
}

#[tokio::test]
async fn test_lower_zoom_tile_is_downscaled() {
    // At zoom 1 one tile spans 1024 native pixels: the map fills its
    // center quarter-to-three-quarters region
    let response = router().oneshot(get("/1/0/0.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tile = decode_png(&body_bytes(response).await);
    assert_eq!(tile.dimensions(), (256, 256));
    assert_eq!(tile.get_pixel(128, 128), &RED);
    assert_eq!(tile.get_pixel(10, 10).0[3], 0);
    assert_eq!(tile.get_pixel(245, 245).0[3], 0);
}

#[tokio::test]
async fn test_every_served_zoom_yields_full_size_tiles() {
    let router = router();
    for (z, x, y) in [(1, 0, 0), (2, 0, 0), (2, 1, 1), (3, 2, 2)] {
        let uri = format!("/{}/{}/{}.png", z, x, y);
        let response = router.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let tile = decode_png(&body_bytes(response).await);
        assert_eq!(tile.dimensions(), (256, 256), "{}", uri);
    }
}

#[tokio::test]
async fn test_tile_without_png_extension() {
    let response = router().oneshot(get("/3/1/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
}

#[tokio::test]
async fn test_cache_hit_header() {
    let router = router();

    let response1 = router.clone().oneshot(get("/3/2/2.png")).await.unwrap();
    assert_eq!(response1.status(), StatusCode::OK);
    assert_eq!(response1.headers().get("x-tile-cache-hit").unwrap(), "false");
    let body1 = body_bytes(response1).await;

    let response2 = router.oneshot(get("/3/2/2.png")).await.unwrap();
    assert_eq!(response2.headers().get("x-tile-cache-hit").unwrap(), "true");
    assert_eq!(body_bytes(response2).await, body1);
}

#[tokio::test]
async fn test_cache_max_age_header() {
    let router = create_render_router(
        red_square_service(),
        RouterConfig::new().with_cache_max_age(120),
    );
    let response = router.oneshot(get("/3/1/1.png")).await.unwrap();
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=120"
    );
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_zoom_above_native_is_not_found() {
    let response = router().oneshot(get("/4/2/2.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "zoom_out_of_range");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_zoom_below_min_is_not_found() {
    let response = router().oneshot(get("/0/0/0.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "zoom_out_of_range");
}

#[tokio::test]
async fn test_malformed_paths_are_not_found() {
    for uri in [
        "/-1/0/0.png",
        "/3/abc/0.png",
        "/3/0/x.png",
        "/3/0/1.jpg",
        "/+3/+1/+1.png",
    ] {
        let response = router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["error"], "invalid_tile", "{}", uri);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Map From Disk
// =============================================================================

#[tokio::test]
async fn test_calibrated_map_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let map_file = dir.path().join("map.png");
    RgbaImage::from_pixel(1000, 800, Rgba([0, 0, 255, 255]))
        .save(&map_file)
        .unwrap();

    let settings = MapSettings {
        map_file,
        min_zoom: 10,
        center_lat: 55.74876,
        center_lon: 37.61573,
        real_width_km: 5.0,
        real_height_km: None,
        native_zoom: None,
    };
    let (renderer, report) = build_renderer(&settings).unwrap();
    assert_eq!(report.geometry.native_zoom, 14);

    let router = create_render_router(RenderService::new(renderer).unwrap(), RouterConfig::new());

    // Tile under the image center at native zoom
    let x = (lon_to_world_x(37.61573, 14) / 256.0) as u32;
    let y = (lat_to_world_y(55.74876, 14) / 256.0) as u32;
    let uri = format!("/14/{}/{}.png", x, y);
    let response = router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tile = decode_png(&body_bytes(response).await);
    assert!(tile.pixels().any(|p| p.0 == [0, 0, 255, 255]));

    // Zoom range is [10, 14]
    let response = router.clone().oneshot(get("/15/0/0.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = router.clone().oneshot(get("/9/0/0.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Far from the map
    let response = router.oneshot(get("/12/0/0.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(is_fully_transparent(&decode_png(
        &body_bytes(response).await
    )));
}

#[test]
fn test_missing_map_file_fails_setup() {
    let settings = MapSettings {
        map_file: "/nonexistent/map.png".into(),
        min_zoom: 10,
        center_lat: 55.74876,
        center_lon: 37.61573,
        real_width_km: 5.0,
        real_height_km: None,
        native_zoom: None,
    };
    assert!(build_renderer(&settings).is_err());
}

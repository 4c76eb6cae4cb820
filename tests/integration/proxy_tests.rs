//! Proxy integration tests.
//!
//! Tests verify:
//! - One origin fetch per tile across repeated requests
//! - Store contents after successful and failed fetches
//! - Direct proxy mode
//! - Headers sent by the HTTP origin client

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get as get_route;
use axum::Router;
use tower::ServiceExt;

use maptile_server::proxy::{
    FsTileStore, HttpOrigin, MemoryTileStore, OriginConfig, ProxyService, TileKey, TileStore,
};
use maptile_server::tile::TileCoord;
use maptile_server::{create_proxy_router, RouterConfig};

use super::test_utils::{body_bytes, body_json, get, MockOrigin};

fn store_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

// =============================================================================
// Cache-Then-Proxy
// =============================================================================

#[tokio::test]
async fn test_repeated_requests_fetch_once() {
    let dir = tempfile::tempdir().unwrap();
    let origin = MockOrigin::new();
    let service = ProxyService::new(origin.clone(), FsTileStore::new(dir.path()));
    let router = create_proxy_router(service, RouterConfig::new());

    let response1 = router
        .clone()
        .oneshot(get("/tiles/12/2475/1280.png"))
        .await
        .unwrap();
    assert_eq!(response1.status(), StatusCode::OK);
    assert_eq!(response1.headers().get("x-tile-cache-hit").unwrap(), "false");
    let body1 = body_bytes(response1).await;
    assert_eq!(body1, MockOrigin::body_for(TileCoord::new(12, 2475, 1280)));

    let response2 = router
        .oneshot(get("/tiles/12/2475/1280.png"))
        .await
        .unwrap();
    assert_eq!(response2.status(), StatusCode::OK);
    assert_eq!(response2.headers().get("x-tile-cache-hit").unwrap(), "true");
    assert_eq!(
        response2.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(body_bytes(response2).await, body1);

    assert_eq!(origin.fetch_count(), 1);
    assert_eq!(store_files(dir.path()), vec!["12_2475_1280.png".to_string()]);
}

#[tokio::test]
async fn test_store_written_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("tile_cache");
    let service = ProxyService::new(MockOrigin::new(), FsTileStore::new(&cache_dir));
    let router = create_proxy_router(service, RouterConfig::new());

    let response = router.oneshot(get("/tiles/3/1/2.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Directory is created on first write
    let on_disk = std::fs::read(cache_dir.join("3_1_2.png")).unwrap();
    assert_eq!(on_disk, MockOrigin::body_for(TileCoord::new(3, 1, 2)).to_vec());
}

#[tokio::test]
async fn test_prepopulated_store_never_contacts_origin() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("7_8_9.png"), b"cached bytes").unwrap();

    let origin = MockOrigin::new();
    let service = ProxyService::new(origin.clone(), FsTileStore::new(dir.path()));
    let router = create_proxy_router(service, RouterConfig::new());

    let response = router.oneshot(get("/tiles/7/8/9.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.as_ref(), b"cached bytes");
    assert_eq!(origin.fetch_count(), 0);
}

#[tokio::test]
async fn test_origin_content_type_passed_through_on_miss() {
    let origin = MockOrigin::new().with_content_type("image/jpeg");
    let service = ProxyService::new(origin, MemoryTileStore::new());
    let router = create_proxy_router(service, RouterConfig::new());

    let response = router.clone().oneshot(get("/tiles/5/5/5.png")).await.unwrap();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );

    // The memory store keeps the content type for hits
    let response = router.oneshot(get("/tiles/5/5/5.png")).await.unwrap();
    assert_eq!(response.headers().get("x-tile-cache-hit").unwrap(), "true");
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn test_distinct_tiles_distinct_entries() {
    let dir = tempfile::tempdir().unwrap();
    let origin = MockOrigin::new();
    let service = ProxyService::new(origin.clone(), FsTileStore::new(dir.path()));
    let router = create_proxy_router(service, RouterConfig::new());

    for uri in ["/tiles/1/12/3.png", "/tiles/11/2/3.png", "/tiles/1/1/23.png"] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    assert_eq!(origin.fetch_count(), 3);
    assert_eq!(
        store_files(dir.path()),
        vec![
            "11_2_3.png".to_string(),
            "1_12_3.png".to_string(),
            "1_1_23.png".to_string(),
        ]
    );
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_origin_failure_is_not_found_and_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let failing = TileCoord::new(13, 100, 200);
    let origin = MockOrigin::new().with_failing(failing);
    let service = ProxyService::new(origin.clone(), FsTileStore::new(dir.path()));
    let router = create_proxy_router(service, RouterConfig::new());

    let response = router
        .clone()
        .oneshot(get("/tiles/13/100/200.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "origin_unavailable");
    assert!(json["message"].as_str().unwrap().contains("502"));

    assert!(store_files(dir.path()).is_empty());

    // Failures are retried on the next request
    let response = router.oneshot(get("/tiles/13/100/200.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(origin.fetch_count(), 2);
}

#[tokio::test]
async fn test_malformed_path_is_not_found() {
    let origin = MockOrigin::new();
    let service = ProxyService::new(origin.clone(), MemoryTileStore::new());
    let router = create_proxy_router(service, RouterConfig::new());

    for uri in [
        "/tiles/a/1/1.png",
        "/tiles/1/-1/1.png",
        "/tiles/1/1/1.gif",
        "/tiles/+1/1/+1.png",
    ] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["error"], "invalid_tile");
    }
    assert_eq!(origin.fetch_count(), 0);
}

// =============================================================================
// Direct Proxy
// =============================================================================

#[tokio::test]
async fn test_direct_mode_always_fetches() {
    let dir = tempfile::tempdir().unwrap();
    let origin = MockOrigin::new();
    let service = ProxyService::new(origin.clone(), FsTileStore::new(dir.path()))
        .with_cache_enabled(false);
    let router = create_proxy_router(service, RouterConfig::new());

    for _ in 0..3 {
        let response = router.clone().oneshot(get("/tiles/2/1/1.png")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-tile-cache-hit").unwrap(), "false");
    }

    assert_eq!(origin.fetch_count(), 3);
    assert!(store_files(dir.path()).is_empty());
}

// =============================================================================
// HTTP Origin
// =============================================================================

type SeenHeaders = Arc<Mutex<Vec<HeaderMap>>>;

/// Start a stub tile provider on an ephemeral port.
///
/// Zoom 13 answers 500; every other tile answers a PNG-typed body naming
/// the requested path.
async fn spawn_stub_origin() -> (String, SeenHeaders) {
    let seen: SeenHeaders = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);

    let app = Router::new().route(
        "/{z}/{x}/{filename}",
        get_route(
            move |Path((z, x, filename)): Path<(u32, u32, String)>, headers: HeaderMap| {
                let seen = Arc::clone(&seen_in_handler);
                async move {
                    seen.lock().unwrap().push(headers);
                    if z == 13 {
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                    (
                        [(header::CONTENT_TYPE, "image/png")],
                        format!("stub {}/{}/{}", z, x, filename),
                    )
                        .into_response()
                }
            },
        ),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/{{z}}/{{x}}/{{y}}.png", addr), seen)
}

#[tokio::test]
async fn test_http_origin_sends_configured_headers() {
    let (template, seen) = spawn_stub_origin().await;

    let config = OriginConfig {
        cookie: Some("uid=test-session".to_string()),
        referer: Some("https://maps.example.com/".to_string()),
        user_agent: "maptile-test/1.0".to_string(),
        timeout: Duration::from_secs(5),
        ..OriginConfig::with_url_template(template)
    };
    let origin = HttpOrigin::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = FsTileStore::new(dir.path());
    let service = ProxyService::new(origin, store.clone());
    let router = create_proxy_router(service, RouterConfig::new());

    let response = router.oneshot(get("/tiles/4/3/2.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(body_bytes(response).await.as_ref(), b"stub 4/3/2.png");

    let key = TileKey::for_tile(TileCoord::new(4, 3, 2));
    let stored = store.get(&key).await.unwrap().unwrap();
    assert_eq!(stored.data.as_ref(), b"stub 4/3/2.png");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let headers = &seen[0];
    assert_eq!(headers.get(header::COOKIE).unwrap(), "uid=test-session");
    assert_eq!(
        headers.get(header::REFERER).unwrap(),
        "https://maps.example.com/"
    );
    assert_eq!(headers.get(header::USER_AGENT).unwrap(), "maptile-test/1.0");
    assert!(headers.contains_key(header::ACCEPT));
    assert!(headers.contains_key(header::ACCEPT_LANGUAGE));
}

#[tokio::test]
async fn test_http_origin_error_status() {
    let (template, _seen) = spawn_stub_origin().await;
    let origin = HttpOrigin::new(OriginConfig::with_url_template(template)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let service = ProxyService::new(origin, FsTileStore::new(dir.path()));
    let router = create_proxy_router(service, RouterConfig::new());

    let response = router.oneshot(get("/tiles/13/1/1.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "origin_unavailable");
    assert!(json["message"].as_str().unwrap().contains("500"));
    assert!(store_files(dir.path()).is_empty());
}

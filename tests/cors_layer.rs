use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use tower::ServiceExt;

use aruco_marker_api::config::CorsConfig;
use aruco_marker_api::{AppConfig, AppState, build_app};

fn app_with_cors(cors: CorsConfig) -> Router {
    let config = AppConfig {
        cors,
        ..AppConfig::default()
    };
    build_app(&config, AppState::default())
}

#[tokio::test]
async fn cors_layer_adds_allow_origin_header() {
    let app = app_with_cors(CorsConfig {
        enabled: true,
        allowed_origins: vec!["https://example.com".to_string()],
        allowed_headers: vec!["Content-Type".to_string()],
        ..CorsConfig::default()
    });

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("call app");

    let allow_origin = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .expect("missing allow origin")
        .to_str()
        .expect("invalid allow origin");
    assert_eq!(allow_origin, "https://example.com");
}

#[tokio::test]
async fn cors_preflight_defaults_to_get_and_post() {
    let app = app_with_cors(CorsConfig {
        enabled: true,
        allowed_origins: vec!["https://example.com".to_string()],
        ..CorsConfig::default()
    });

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/generate-multiple")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("call app");

    let allow_methods = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .expect("missing allow methods")
        .to_str()
        .expect("invalid allow methods");
    assert!(allow_methods.contains("GET"));
    assert!(allow_methods.contains("POST"));
}

#[tokio::test]
async fn cors_disabled_adds_no_headers() {
    let app = app_with_cors(CorsConfig::default());
    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("call app");
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

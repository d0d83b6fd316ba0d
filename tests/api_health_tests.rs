//! 健康检查 API 集成测试

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{body_json, create_offline_app_state};

#[tokio::test]
async fn test_health_endpoint() {
    let app = medstock::routes::create_router(create_offline_app_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_trace_id_is_propagated() {
    let app = medstock::routes::create_router(create_offline_app_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = medstock::routes::create_router(create_offline_app_state());

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["ready"], false);
    assert_eq!(json["checks"][0]["name"], "database");
    assert_eq!(json["checks"][0]["status"], "unhealthy");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = medstock::routes::create_router(create_offline_app_state());

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

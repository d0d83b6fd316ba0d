//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{auth, handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh_token));

    // 库存路由（可选认证：带令牌时记录操作人）
    let inventory_routes = Router::new()
        .route("/api/v1/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/v1/alerts", get(handlers::dashboard::list_alerts))
        .route("/api/v1/medicines", get(handlers::medicine::list_medicines))
        .route("/api/v1/medicines/{id}", get(handlers::medicine::get_medicine))
        .route(
            "/api/v1/medicines/{id}/transactions",
            get(handlers::medicine::list_transactions),
        )
        .route("/api/v1/expired", get(handlers::medicine::list_expired))
        .route("/update_stock/{id}", post(handlers::stock::update_stock))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            auth::optional_auth_middleware,
        ));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::get_current_user))
        .route("/api/v1/medicines", post(handlers::medicine::create_medicine))
        .route("/api/v1/medicines/{id}", delete(handlers::medicine::delete_medicine))
        .route(
            "/api/v1/medicines/archive-expired",
            post(handlers::medicine::archive_expired),
        )
        .route("/api/v1/medicines/{id}/sales", post(handlers::sales::create_sale))
        .route("/api/v1/sales", get(handlers::sales::list_sales))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            auth::jwt_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(inventory_routes)
        .merge(authenticated_routes)
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(state.config.server.body_limit_bytes))
        .layer(cors_layer(state.config.security.cors_allowed_origins.as_deref()))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 跨域配置，未配置来源时允许任意来源
fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origin = match allowed_origins {
        Some(origins) if !origins.is_empty() => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect::<Vec<_>>(),
        ),
        _ => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

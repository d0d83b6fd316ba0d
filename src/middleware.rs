//! HTTP 中间件
//! 应用状态与请求追踪

use axum::{extract::Request, http::HeaderMap, http::HeaderValue, middleware::Next, response::Response};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::JwtService,
    config::AppConfig,
    error::AppError,
    services::{AuthService, InventoryService},
};

/// 应用状态
///
/// 服务使用 Arc 包装，请求间共享同一实例，Clone 只是指针拷贝。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: PgPool,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub inventory_service: Arc<InventoryService>,
}

impl AppState {
    /// 根据配置和连接池组装全部服务
    pub fn new(config: AppConfig, db: PgPool) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config.security)?);

        let auth_service = Arc::new(AuthService::new(
            db.clone(),
            jwt_service.clone(),
            config.security.clone(),
        ));
        let inventory_service =
            Arc::new(InventoryService::new(db.clone(), config.inventory.clone()));

        Ok(Self {
            config,
            db,
            jwt_service,
            auth_service,
            inventory_service,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签只使用有限集合的静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_class = match status {
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_class)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        assert_eq!(extract_or_generate_trace_id(&headers), "test-trace-123");

        let trace_id = extract_or_generate_trace_id(&HeaderMap::new());
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }
}

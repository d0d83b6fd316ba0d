//! 存活与就绪探针

use axum::{extract::State, http::StatusCode, Json};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{db, middleware::AppState};

static STARTED_AT: OnceCell<Instant> = OnceCell::new();

/// 记录进程启动时刻，只有第一次调用生效
pub fn set_start_time() {
    let _ = STARTED_AT.set(Instant::now());
}

pub fn get_uptime() -> u64 {
    STARTED_AT.get().map_or(0, |t| t.elapsed().as_secs())
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<DependencyCheck>,
}

#[derive(Serialize)]
pub struct DependencyCheck {
    pub name: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime(),
    })
}

/// GET /ready
///
/// 数据库不可用时仍返回 200，由 `ready` 字段表达结果。
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    db::record_pool_metrics(&state.db);

    let database = match db::health_check(&state.db).await {
        db::HealthStatus::Healthy { latency_ms } => DependencyCheck {
            name: "database",
            status: "healthy",
            latency_ms: Some(latency_ms),
            error: None,
        },
        db::HealthStatus::Unhealthy(error) => DependencyCheck {
            name: "database",
            status: "unhealthy",
            latency_ms: None,
            error: Some(error),
        },
    };

    let checks = vec![database];
    let ready = checks.iter().all(|c| c.status == "healthy");

    (StatusCode::OK, Json(ReadinessResponse { ready, checks }))
}

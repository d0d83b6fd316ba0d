//! 仪表盘与过期预警处理器

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::today;
use crate::{error::AppError, middleware::AppState, models::medicine::AlertQuery};

/// 仪表盘统计
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let stats = state.inventory_service.dashboard(today()).await?;
    Ok(Json(stats))
}

/// 过期预警列表
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let (window, medicines) = state
        .inventory_service
        .expiry_alerts(today(), query.days)
        .await?;

    Ok(Json(json!({
        "alert_days": window,
        "count": medicines.len(),
        "medicines": medicines
    })))
}

//! 药品管理的 HTTP 处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::today;
use crate::{
    auth::AuthContext, error::AppError, middleware::AppState,
    models::medicine::CreateMedicineRequest,
};

/// 列出药品（按过期日期排序）
pub async fn list_medicines(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let medicines = state.inventory_service.list_medicines(today()).await?;

    Ok(Json(json!({
        "medicines": medicines,
        "count": medicines.len()
    })))
}

/// 新增药品
pub async fn create_medicine(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMedicineRequest>,
) -> Result<impl IntoResponse, AppError> {
    let medicine = state.inventory_service.add_medicine(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Medicine added",
            "medicine": medicine
        })),
    ))
}

/// 获取药品详情
pub async fn get_medicine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let medicine = state.inventory_service.get_medicine(id, today()).await?;
    Ok(Json(medicine))
}

/// 删除药品
pub async fn delete_medicine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.inventory_service.delete_medicine(id).await?;

    Ok(Json(json!({
        "message": "Medicine deleted"
    })))
}

/// 药品库存流水
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let transactions = state.inventory_service.transactions(id).await?;

    Ok(Json(json!({
        "transactions": transactions,
        "count": transactions.len()
    })))
}

/// 归档已过期药品（需要登录）
pub async fn archive_expired(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let archived = state
        .inventory_service
        .archive_expired(today(), auth_context.user_id)
        .await?;

    let total_value: f64 = archived.iter().map(|m| m.original_value).sum();

    Ok(Json(json!({
        "archived": archived,
        "count": archived.len(),
        "total_value": total_value
    })))
}

/// 已归档的过期药品
pub async fn list_expired(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let expired = state.inventory_service.list_expired().await?;

    Ok(Json(json!({
        "expired": expired,
        "count": expired.len()
    })))
}

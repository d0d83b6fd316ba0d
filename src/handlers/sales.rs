//! 销售处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{auth::AuthContext, error::AppError, middleware::AppState, models::sale::CreateSaleRequest};

/// 记录销售（需要登录）
pub async fn create_sale(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (sale, medicine) = state
        .inventory_service
        .record_sale(id, req, auth_context.user_id)
        .await?;

    metrics::counter!("sales_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Sale recorded",
            "sale": sale,
            "remaining_quantity": medicine.quantity
        })),
    ))
}

/// 销售记录列表
pub async fn list_sales(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let sales = state.inventory_service.list_sales().await?;
    let total_amount: f64 = sales.iter().map(|s| s.total_amount).sum();

    Ok(Json(json!({
        "sales": sales,
        "count": sales.len(),
        "total_amount": total_amount
    })))
}

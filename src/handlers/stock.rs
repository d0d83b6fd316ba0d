//! 库存变更处理器
//!
//! `POST /update_stock/{id}` 接收表单编码字段，始终以
//! `{success, error?, medicine?}` 应答业务结果；只有基础设施故障才返回 5xx。

use axum::{
    extract::{Path, State},
    Form, Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    auth::AuthContext,
    error::AppError,
    middleware::AppState,
    models::stock::StockUpdateResponse,
};

/// 库存变更
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    auth_context: Option<AuthContext>,
    Path(raw_id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<StockUpdateResponse>, AppError> {
    let user_id = auth_context.map(|ctx| ctx.user_id);

    let result = async {
        let id: i64 = raw_id
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid medicine id: {}", raw_id)))?;
        let form = state.inventory_service.parse_stock_form(&fields)?;
        state.inventory_service.update_stock(id, &form, user_id).await
    }
    .await;

    match result {
        Ok(medicine) => {
            metrics::counter!("stock_updates_total", "outcome" => "updated").increment(1);
            Ok(Json(StockUpdateResponse::updated(medicine)))
        }
        Err(e) if e.is_client_error() => {
            metrics::counter!("stock_updates_total", "outcome" => "rejected").increment(1);
            tracing::warn!(medicine_id = %raw_id, error = %e, "Stock update rejected");
            Ok(Json(StockUpdateResponse::failure(e.user_message())))
        }
        Err(e) => {
            metrics::counter!("stock_updates_total", "outcome" => "failed").increment(1);
            Err(e)
        }
    }
}

//! Sale models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Recorded sale. `medicine_name` survives deletion of the medicine row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub id: i64,
    pub medicine_id: Option<i64>,
    pub medicine_name: String,
    pub user_id: Option<Uuid>,
    pub quantity: i32,
    pub sale_price: f64,
    pub total_amount: f64,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,
}

/// `POST /api/v1/medicines/{id}/sales` body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSaleRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Unit price; the medicine's recorded price when omitted
    #[validate(range(min = 0.0, message = "Sale price must not be negative"))]
    pub sale_price: Option<f64>,
    #[validate(length(max = 100, message = "Customer name must be at most 100 characters"))]
    pub customer_name: Option<String>,
    #[validate(length(max = 200, message = "Notes must be at most 200 characters"))]
    pub notes: Option<String>,
}

impl CreateSaleRequest {
    pub fn unit_price(&self, list_price: f64) -> f64 {
        self.sale_price.unwrap_or(list_price)
    }

    pub fn total_amount(&self, list_price: f64) -> f64 {
        f64::from(self.quantity) * self.unit_price(list_price)
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

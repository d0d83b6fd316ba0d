//! Medicine domain models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Medicine stock record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub batch_number: String,
    pub category: String,
    pub quantity: i32,
    pub price: f64,
    pub expiry_date: NaiveDate,
    pub low_stock_alert: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Whole days until expiry; negative once expired.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_alert
    }

    /// Stock value at the recorded unit price
    pub fn stock_value(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// Expiry classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Expired,
    Expiring,
    Safe,
}

impl ExpiryStatus {
    pub fn classify(days_left: i64, expiring_soon_days: i64) -> Self {
        if days_left < 0 {
            ExpiryStatus::Expired
        } else if days_left <= expiring_soon_days {
            ExpiryStatus::Expiring
        } else {
            ExpiryStatus::Safe
        }
    }
}

/// Medicine with derived expiry/stock fields for list views
#[derive(Debug, Clone, Serialize)]
pub struct MedicineView {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub status: ExpiryStatus,
    pub days_left: i64,
    pub low_stock: bool,
}

impl MedicineView {
    pub fn new(medicine: Medicine, today: NaiveDate, expiring_soon_days: i64) -> Self {
        let days_left = medicine.days_left(today);
        let low_stock = medicine.is_low_stock();
        Self {
            status: ExpiryStatus::classify(days_left, expiring_soon_days),
            days_left,
            low_stock,
            medicine,
        }
    }
}

/// Add medicine request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMedicineRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Batch number must be 1-50 characters"))]
    pub batch_number: String,
    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,
    #[validate(range(min = 0, max = 1000000, message = "Quantity must be between 0 and 1000000"))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    pub expiry_date: NaiveDate,
    #[validate(range(min = 0, message = "Low stock alert must not be negative"))]
    pub low_stock_alert: Option<i32>,
}

fn default_category() -> String {
    "tablet".to_string()
}

/// Expiry alert query
#[derive(Debug, Deserialize, Validate)]
pub struct AlertQuery {
    #[validate(range(min = 1, max = 365, message = "days must be between 1 and 365"))]
    pub days: Option<i64>,
}

/// Archived expired medicine
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExpiredMedicine {
    pub id: i64,
    pub medicine_id: i64,
    pub user_id: Option<uuid::Uuid>,
    pub name: String,
    pub batch_number: String,
    pub category: String,
    pub quantity: i32,
    pub price: f64,
    pub expiry_date: NaiveDate,
    pub original_value: f64,
    pub expired_at: DateTime<Utc>,
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: i64,
    pub expiring_soon: i64,
    pub expiring_month: i64,
    pub total_quantity: i64,
    pub low_stock: i64,
    pub expired: i64,
}

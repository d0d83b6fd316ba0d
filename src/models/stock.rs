//! Stock movement models and the stock-update wire contract

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::medicine::Medicine;
use crate::error::AppError;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "add" => Ok(TransactionType::In),
            "out" | "remove" => Ok(TransactionType::Out),
            other => Err(AppError::Validation(format!(
                "Unknown transaction type: {}",
                other
            ))),
        }
    }
}

/// Recorded stock movement
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockTransaction {
    pub id: i64,
    pub medicine_id: i64,
    pub user_id: Option<Uuid>,
    pub transaction_type: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parsed `POST /update_stock/{id}` form.
///
/// Fields arrive form-encoded and untyped; parsing is done here so every
/// malformed field becomes a readable message instead of an extractor
/// rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct StockUpdateForm {
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub notes: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

const MAX_NOTES_LEN: usize = 200;
const MAX_BATCH_LEN: usize = 50;

impl StockUpdateForm {
    pub fn from_fields(fields: &HashMap<String, String>, max_change: i32) -> Result<Self, AppError> {
        let non_empty = |key: &str| {
            fields
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let transaction_type = match non_empty("transaction_type") {
            Some(raw) => raw.parse()?,
            None => TransactionType::In,
        };

        let raw_quantity = non_empty("quantity")
            .ok_or_else(|| AppError::Validation("Quantity is required".to_string()))?;
        let quantity: i32 = raw_quantity
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid quantity: {}", raw_quantity)))?;
        if quantity < 1 || quantity > max_change {
            return Err(AppError::Validation(format!(
                "Quantity must be between 1 and {}",
                max_change
            )));
        }

        let notes = non_empty("notes");
        if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
            return Err(AppError::Validation(format!(
                "Notes must be at most {} characters",
                MAX_NOTES_LEN
            )));
        }

        let batch_number = non_empty("batch_number");
        if batch_number.as_ref().is_some_and(|b| b.chars().count() > MAX_BATCH_LEN) {
            return Err(AppError::Validation(format!(
                "Batch number must be at most {} characters",
                MAX_BATCH_LEN
            )));
        }

        let expiry_date = non_empty("expiry_date")
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| AppError::Validation(format!("Invalid expiry date: {}", raw)))
            })
            .transpose()?;

        Ok(Self {
            transaction_type,
            quantity,
            notes,
            batch_number,
            expiry_date,
        })
    }

    /// Signed change applied to the stored quantity
    pub fn delta(&self) -> i32 {
        match self.transaction_type {
            TransactionType::In => self.quantity,
            TransactionType::Out => -self.quantity,
        }
    }

    /// Stock level after applying this movement to `current`.
    pub fn apply_to(&self, current: i32) -> Result<i32, AppError> {
        match self.transaction_type {
            TransactionType::In => current.checked_add(self.quantity).ok_or_else(|| {
                AppError::Validation(format!(
                    "Stock cannot exceed {} units (currently {})",
                    i32::MAX,
                    current
                ))
            }),
            TransactionType::Out => current
                .checked_sub(self.quantity)
                .filter(|q| *q >= 0)
                .ok_or(AppError::InsufficientStock {
                    available: current,
                    requested: self.quantity,
                }),
        }
    }
}

/// Result of a stock update.
///
/// `success` and `error` are the fields every client reads; `medicine`
/// carries the updated record so a view can refresh that row alone.
/// A `medicine` value of any other shape decodes as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUpdateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_medicine"
    )]
    pub medicine: Option<Medicine>,
}

fn lenient_medicine<'de, D>(deserializer: D) -> Result<Option<Medicine>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl StockUpdateResponse {
    pub fn updated(medicine: Medicine) -> Self {
        Self {
            success: true,
            error: None,
            medicine: Some(medicine),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            medicine: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_defaults_to_stock_in() {
        let form = StockUpdateForm::from_fields(&fields(&[("quantity", "5")]), 1000).unwrap();
        assert_eq!(form.transaction_type, TransactionType::In);
        assert_eq!(form.delta(), 5);
        assert!(form.notes.is_none());
    }

    #[test]
    fn test_parse_full_form() {
        let form = StockUpdateForm::from_fields(
            &fields(&[
                ("transaction_type", "out"),
                ("quantity", " 3 "),
                ("notes", "dispensed"),
                ("batch_number", "B99"),
                ("expiry_date", "2026-01-31"),
            ]),
            1000,
        )
        .unwrap();

        assert_eq!(form.delta(), -3);
        assert_eq!(form.notes.as_deref(), Some("dispensed"));
        assert_eq!(form.batch_number.as_deref(), Some("B99"));
        assert_eq!(form.expiry_date, NaiveDate::from_ymd_opt(2026, 1, 31));
    }

    #[test]
    fn test_apply_to_checks_bounds() {
        let stock_in = StockUpdateForm::from_fields(&fields(&[("quantity", "1")]), 1000).unwrap();
        assert_eq!(stock_in.apply_to(46).unwrap(), 47);

        let err = stock_in.apply_to(i32::MAX).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.user_message().starts_with("Stock cannot exceed"));

        let stock_out = StockUpdateForm::from_fields(
            &fields(&[("transaction_type", "out"), ("quantity", "5")]),
            1000,
        )
        .unwrap();
        assert_eq!(stock_out.apply_to(5).unwrap(), 0);
        assert_eq!(
            stock_out.apply_to(4).unwrap_err().user_message(),
            "Insufficient stock: only 4 available"
        );
    }

    #[test]
    fn test_parse_rejects_bad_quantities() {
        for raw in ["0", "-4", "abc", "1001"] {
            let err = StockUpdateForm::from_fields(&fields(&[("quantity", raw)]), 1000).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "quantity {raw} accepted");
        }

        let missing = StockUpdateForm::from_fields(&fields(&[]), 1000).unwrap_err();
        assert_eq!(missing.user_message(), "Quantity is required");
    }

    #[test]
    fn test_parse_rejects_unknown_type_and_bad_date() {
        let err = StockUpdateForm::from_fields(
            &fields(&[("transaction_type", "transfer"), ("quantity", "1")]),
            1000,
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "Unknown transaction type: transfer");

        let err = StockUpdateForm::from_fields(
            &fields(&[("quantity", "1"), ("expiry_date", "31/01/2026")]),
            1000,
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "Invalid expiry date: 31/01/2026");
    }

    #[test]
    fn test_response_wire_shape() {
        let failure = serde_json::to_value(StockUpdateResponse::failure("Out of stock")).unwrap();
        assert_eq!(failure, serde_json::json!({"success": false, "error": "Out of stock"}));

        let minimal: StockUpdateResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(minimal.success);
        assert!(minimal.error.is_none());
        assert!(minimal.medicine.is_none());
    }

    #[test]
    fn test_response_tolerates_unknown_medicine_shape() {
        let partial: StockUpdateResponse =
            serde_json::from_str(r#"{"success":true,"medicine":{"id":1,"quantity":47}}"#).unwrap();
        assert!(partial.success);
        assert!(partial.medicine.is_none());

        let odd: StockUpdateResponse =
            serde_json::from_str(r#"{"success":false,"error":"Out of stock","medicine":"n/a"}"#)
                .unwrap();
        assert_eq!(odd.error.as_deref(), Some("Out of stock"));
        assert!(odd.medicine.is_none());
    }
}

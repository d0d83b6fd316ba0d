//! Sale repository (销售数据访问)

use crate::{
    error::AppError,
    models::{
        medicine::Medicine,
        sale::{CreateSaleRequest, Sale},
        stock::{StockUpdateForm, TransactionType},
    },
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct SaleRepository {
    db: PgPool,
}

impl SaleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 记录销售并扣减库存
    ///
    /// 与库存变更相同，锁定药品行后在同一事务内扣减、写销售记录与出库流水。
    pub async fn record(
        &self,
        medicine_id: i64,
        req: &CreateSaleRequest,
        user_id: Uuid,
    ) -> Result<(Sale, Medicine), AppError> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1 FOR UPDATE")
            .bind(medicine_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Medicine"))?;

        let movement = StockUpdateForm {
            transaction_type: TransactionType::Out,
            quantity: req.quantity,
            notes: None,
            batch_number: None,
            expiry_date: None,
        };
        let remaining = movement.apply_to(current.quantity)?;

        let updated = sqlx::query_as::<_, Medicine>(
            "UPDATE medicines SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(medicine_id)
        .bind(remaining)
        .fetch_one(&mut *tx)
        .await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                medicine_id, medicine_name, user_id, quantity,
                sale_price, total_amount, customer_name, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(medicine_id)
        .bind(&current.name)
        .bind(user_id)
        .bind(req.quantity)
        .bind(req.unit_price(current.price))
        .bind(req.total_amount(current.price))
        .bind(req.customer())
        .bind(req.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_transactions (medicine_id, user_id, transaction_type, quantity, notes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(medicine_id)
        .bind(user_id)
        .bind(TransactionType::Out.as_str())
        .bind(req.quantity)
        .bind(format!("Sale #{}", sale.id))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((sale, updated))
    }

    /// 销售记录（最新在前）
    pub async fn list(&self) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY sale_date DESC, id DESC")
            .fetch_all(&self.db)
            .await?;

        Ok(sales)
    }
}

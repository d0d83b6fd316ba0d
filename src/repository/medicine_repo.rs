//! Medicine repository (药品库存数据访问)

use crate::{
    error::AppError,
    models::{medicine::*, stock::*},
};
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct MedicineRepository {
    db: PgPool,
}

impl MedicineRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 新增药品
    pub async fn create(
        &self,
        req: &CreateMedicineRequest,
        default_low_stock_alert: i32,
    ) -> Result<Medicine, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            INSERT INTO medicines (name, batch_number, category, quantity, price, expiry_date, low_stock_alert)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(req.name.trim())
        .bind(req.batch_number.trim())
        .bind(req.category.trim())
        .bind(req.quantity)
        .bind(req.price)
        .bind(req.expiry_date)
        .bind(req.low_stock_alert.unwrap_or(default_low_stock_alert))
        .fetch_one(&self.db)
        .await?;

        Ok(medicine)
    }

    /// 获取药品
    pub async fn get(&self, id: i64) -> Result<Option<Medicine>, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(medicine)
    }

    /// 列出全部药品（按过期日期排序）
    pub async fn list(&self) -> Result<Vec<Medicine>, AppError> {
        let medicines =
            sqlx::query_as::<_, Medicine>("SELECT * FROM medicines ORDER BY expiry_date, name")
                .fetch_all(&self.db)
                .await?;

        Ok(medicines)
    }

    /// 列出 [from, until] 区间内过期的药品
    pub async fn list_expiring_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Medicine>, AppError> {
        let medicines = sqlx::query_as::<_, Medicine>(
            r#"
            SELECT * FROM medicines
            WHERE expiry_date >= $1 AND expiry_date <= $2
            ORDER BY expiry_date, name
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        Ok(medicines)
    }

    /// 删除药品
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM medicines WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 仪表盘统计
    pub async fn dashboard_stats(
        &self,
        today: NaiveDate,
        soon_until: NaiveDate,
        month_until: NaiveDate,
    ) -> Result<DashboardStats, AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE expiry_date >= $1 AND expiry_date <= $2) AS expiring_soon,
                COUNT(*) FILTER (WHERE expiry_date >= $1 AND expiry_date <= $3) AS expiring_month,
                COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                COUNT(*) FILTER (WHERE quantity <= low_stock_alert) AS low_stock,
                COUNT(*) FILTER (WHERE expiry_date < $1) AS expired
            FROM medicines
            "#,
        )
        .bind(today)
        .bind(soon_until)
        .bind(month_until)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardStats {
            total: row.try_get("total")?,
            expiring_soon: row.try_get("expiring_soon")?,
            expiring_month: row.try_get("expiring_month")?,
            total_quantity: row.try_get("total_quantity")?,
            low_stock: row.try_get("low_stock")?,
            expired: row.try_get("expired")?,
        })
    }

    /// 应用库存变更并记录流水
    ///
    /// 在单个事务中锁定药品行，出库数量超过库存时整体回滚。
    pub async fn apply_stock_change(
        &self,
        id: i64,
        form: &StockUpdateForm,
        user_id: Option<Uuid>,
    ) -> Result<Medicine, AppError> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Medicine"))?;

        let new_quantity = form.apply_to(current.quantity)?;

        let updated = sqlx::query_as::<_, Medicine>(
            r#"
            UPDATE medicines
            SET
                quantity = $2,
                batch_number = COALESCE($3, batch_number),
                expiry_date = COALESCE($4, expiry_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_quantity)
        .bind(&form.batch_number)
        .bind(form.expiry_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_transactions (medicine_id, user_id, transaction_type, quantity, notes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(form.transaction_type.as_str())
        .bind(form.quantity)
        .bind(&form.notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// 药品库存流水（最新在前）
    pub async fn list_transactions(&self, medicine_id: i64) -> Result<Vec<StockTransaction>, AppError> {
        let transactions = sqlx::query_as::<_, StockTransaction>(
            "SELECT * FROM stock_transactions WHERE medicine_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(medicine_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }

    /// 将已过期药品归档并从库存中移除
    ///
    /// 删除与归档在同一条语句中完成，两者看到同一快照。
    pub async fn archive_expired(
        &self,
        today: NaiveDate,
        user_id: Option<Uuid>,
    ) -> Result<Vec<ExpiredMedicine>, AppError> {
        let archived = sqlx::query_as::<_, ExpiredMedicine>(
            r#"
            WITH moved AS (
                DELETE FROM medicines
                WHERE expiry_date < $1
                RETURNING id, name, batch_number, category, quantity, price, expiry_date
            )
            INSERT INTO expired_medicines (
                medicine_id, user_id, name, batch_number, category,
                quantity, price, expiry_date, original_value
            )
            SELECT id, $2, name, batch_number, category,
                   quantity, price, expiry_date, quantity * price
            FROM moved
            RETURNING *
            "#,
        )
        .bind(today)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(archived)
    }

    /// 已归档的过期药品
    pub async fn list_expired(&self) -> Result<Vec<ExpiredMedicine>, AppError> {
        let expired = sqlx::query_as::<_, ExpiredMedicine>(
            "SELECT * FROM expired_medicines ORDER BY expired_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(expired)
    }
}

//! 库存服务：药品管理、过期预警、库存变更

use crate::{
    config::InventoryConfig,
    error::AppError,
    models::{medicine::*, sale::*, stock::*},
    repository::{MedicineRepository, SaleRepository},
};
use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

pub struct InventoryService {
    db: PgPool,
    config: InventoryConfig,
}

impl InventoryService {
    pub fn new(db: PgPool, config: InventoryConfig) -> Self {
        Self { db, config }
    }

    fn repo(&self) -> MedicineRepository {
        MedicineRepository::new(self.db.clone())
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    fn view(&self, medicine: Medicine, today: NaiveDate) -> MedicineView {
        MedicineView::new(medicine, today, self.config.expiring_soon_days)
    }

    /// 药品列表（附带过期状态）
    pub async fn list_medicines(&self, today: NaiveDate) -> Result<Vec<MedicineView>, AppError> {
        let medicines = self.repo().list().await?;
        Ok(medicines.into_iter().map(|m| self.view(m, today)).collect())
    }

    /// 药品详情
    pub async fn get_medicine(&self, id: i64, today: NaiveDate) -> Result<MedicineView, AppError> {
        let medicine = self
            .repo()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Medicine"))?;

        Ok(self.view(medicine, today))
    }

    /// 新增药品
    pub async fn add_medicine(&self, req: CreateMedicineRequest) -> Result<Medicine, AppError> {
        req.validate()?;

        let medicine = self
            .repo()
            .create(&req, self.config.default_low_stock_alert)
            .await?;

        tracing::info!(
            medicine_id = medicine.id,
            name = %medicine.name,
            quantity = medicine.quantity,
            "Medicine added"
        );

        Ok(medicine)
    }

    /// 删除药品
    pub async fn delete_medicine(&self, id: i64) -> Result<(), AppError> {
        if !self.repo().delete(id).await? {
            return Err(AppError::not_found("Medicine"));
        }

        tracing::info!(medicine_id = id, "Medicine deleted");
        Ok(())
    }

    /// 即将过期药品（默认窗口来自配置）
    pub async fn expiry_alerts(
        &self,
        today: NaiveDate,
        days: Option<i64>,
    ) -> Result<(i64, Vec<MedicineView>), AppError> {
        let window = days.unwrap_or(self.config.alert_window_days);
        let until = today + Duration::days(window);

        let medicines = self.repo().list_expiring_between(today, until).await?;
        Ok((window, medicines.into_iter().map(|m| self.view(m, today)).collect()))
    }

    /// 仪表盘统计
    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats, AppError> {
        let soon_until = today + Duration::days(self.config.expiring_soon_days);
        let month_until = today + Duration::days(self.config.alert_window_days);

        self.repo().dashboard_stats(today, soon_until, month_until).await
    }

    /// 解析表单字段（不访问数据库）
    pub fn parse_stock_form(&self, fields: &HashMap<String, String>) -> Result<StockUpdateForm, AppError> {
        StockUpdateForm::from_fields(fields, self.config.max_stock_change)
    }

    /// 库存变更
    pub async fn update_stock(
        &self,
        id: i64,
        form: &StockUpdateForm,
        user_id: Option<Uuid>,
    ) -> Result<Medicine, AppError> {
        let updated = self.repo().apply_stock_change(id, form, user_id).await?;

        tracing::info!(
            medicine_id = id,
            transaction_type = form.transaction_type.as_str(),
            quantity = form.quantity,
            new_quantity = updated.quantity,
            user_id = ?user_id,
            "Stock updated"
        );

        if updated.is_low_stock() {
            tracing::warn!(
                medicine_id = id,
                quantity = updated.quantity,
                low_stock_alert = updated.low_stock_alert,
                "Medicine at or below low stock threshold"
            );
        }

        Ok(updated)
    }

    /// 库存流水
    pub async fn transactions(&self, id: i64) -> Result<Vec<StockTransaction>, AppError> {
        let repo = self.repo();
        if repo.get(id).await?.is_none() {
            return Err(AppError::not_found("Medicine"));
        }

        repo.list_transactions(id).await
    }

    /// 归档过期药品
    pub async fn archive_expired(
        &self,
        today: NaiveDate,
        user_id: Uuid,
    ) -> Result<Vec<ExpiredMedicine>, AppError> {
        let archived = self.repo().archive_expired(today, Some(user_id)).await?;

        tracing::info!(
            count = archived.len(),
            user_id = %user_id,
            "Expired medicines archived"
        );

        Ok(archived)
    }

    pub async fn list_expired(&self) -> Result<Vec<ExpiredMedicine>, AppError> {
        self.repo().list_expired().await
    }

    /// 销售出库
    pub async fn record_sale(
        &self,
        id: i64,
        req: CreateSaleRequest,
        user_id: Uuid,
    ) -> Result<(Sale, Medicine), AppError> {
        req.validate()?;
        if req.quantity > self.config.max_stock_change {
            return Err(AppError::Validation(format!(
                "Quantity must be between 1 and {}",
                self.config.max_stock_change
            )));
        }

        let (sale, medicine) = SaleRepository::new(self.db.clone())
            .record(id, &req, user_id)
            .await?;

        tracing::info!(
            sale_id = sale.id,
            medicine_id = id,
            quantity = sale.quantity,
            total_amount = sale.total_amount,
            user_id = %user_id,
            "Sale recorded"
        );

        if medicine.is_low_stock() {
            tracing::warn!(
                medicine_id = id,
                quantity = medicine.quantity,
                low_stock_alert = medicine.low_stock_alert,
                "Medicine at or below low stock threshold"
            );
        }

        Ok((sale, medicine))
    }

    pub async fn list_sales(&self) -> Result<Vec<Sale>, AppError> {
        SaleRepository::new(self.db.clone()).list().await
    }
}

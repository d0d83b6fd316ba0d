//! HTTP 处理器模块

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod medicine;
pub mod sales;
pub mod stock;

use chrono::NaiveDate;

/// 服务器本地日期，所有过期计算以此为准
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

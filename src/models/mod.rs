//! 数据模型模块

pub mod auth;
pub mod medicine;
pub mod sale;
pub mod stock;
pub mod user;

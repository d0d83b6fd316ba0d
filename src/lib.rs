//! 药品库存系统库
//! 提供库存服务（HTTP API）与前端交互组件（库存更新控制器、登录表单）

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;

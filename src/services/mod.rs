//! 业务服务层

pub mod auth_service;
pub mod inventory_service;

pub use auth_service::AuthService;
pub use inventory_service::InventoryService;

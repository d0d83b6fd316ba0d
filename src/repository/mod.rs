//! Database repository layer

pub mod auth_repo;
pub mod medicine_repo;
pub mod sale_repo;
pub mod user_repo;

pub use auth_repo::*;
pub use medicine_repo::*;
pub use sale_repo::*;
pub use user_repo::*;

//! PostgreSQL 连接池
//! 连接池构建、嵌入式迁移、就绪探测

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::{Duration, Instant};

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// 探测结果
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy { latency_ms: u64 },
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
}

/// 建立连接池，启动时即连接
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = pool_options(config)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Could not connect to the inventory database");
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Inventory database pool ready"
    );

    Ok(pool)
}

/// 惰性连接池：首次查询时才连接（测试和离线工具使用）
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    pool_options(config)
        .min_connections(0)
        .connect_lazy(config.url.expose_secret())
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))
}

/// 执行 migrations/ 下的嵌入式迁移
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Schema migration failed");
        DbError::MigrationFailed(e.to_string())
    })?;

    tracing::info!("Inventory schema up to date");
    Ok(())
}

/// 就绪探测，记录往返耗时
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    let started = Instant::now();

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthStatus::Healthy {
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database probe failed");
            HealthStatus::Unhealthy(e.to_string())
        }
    }
}

pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as f64;
    let idle = pool.num_idle() as f64;
    metrics::gauge!("db_pool_connections", "state" => "idle").set(idle);
    metrics::gauge!("db_pool_connections", "state" => "in_use").set(size - idle);
}

//! Authentication repository (认证数据访问)

use crate::{error::AppError, models::auth::RefreshToken};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

pub struct AuthRepository {
    db: PgPool,
}

impl AuthRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 令牌哈希（数据库只保存哈希）
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// 存储刷新令牌
    pub async fn store_refresh_token(&self, token: &RefreshToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, token_hash, user_id, expires_at, rotated_from, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.rotated_from)
        .bind(token.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 根据哈希查找刷新令牌
    pub async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, AppError> {
        let token =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.db)
                .await?;

        Ok(token)
    }

    /// 撤销刷新令牌
    pub async fn revoke_refresh_token(&self, token_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(token_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = AuthRepository::hash_token("refresh-token");
        let b = AuthRepository::hash_token("refresh-token");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, AuthRepository::hash_token("other-token"));
    }
}

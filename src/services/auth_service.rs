//! 认证服务：注册、登录、令牌刷新

use crate::{
    auth::{jwt::JwtService, jwt::TokenPair, password::PasswordHasher},
    config::SecurityConfig,
    error::AppError,
    models::{auth::*, user::*},
    repository::{AuthRepository, UserRepository},
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct AuthService {
    db: PgPool,
    jwt_service: Arc<JwtService>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_service: Arc<JwtService>, security: SecurityConfig) -> Self {
        Self {
            db,
            jwt_service,
            security,
        }
    }

    /// 用户注册
    pub async fn register(&self, req: CreateUserRequest) -> Result<UserResponse, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.security)?;

        let password_hash = PasswordHasher::new().hash(&req.password)?;
        let user = UserRepository::new(self.db.clone())
            .create(req.username.trim(), req.email.trim(), &password_hash)
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(UserResponse::from(user))
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AppError::Validation("Please fill in all fields".to_string()));
        }

        let user_repo = UserRepository::new(self.db.clone());

        let user = match user_repo.find_by_email(req.email.trim()).await? {
            Some(user) => user,
            None => {
                tracing::info!(email = %req.email, "Login failed: unknown email");
                return Err(AppError::Unauthorized);
            }
        };

        if let Err(e) = PasswordHasher::new().verify(&req.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "Login failed: wrong password");
            return Err(e);
        }

        let token_pair = self.issue_tokens(&user.id, &user.username, None).await?;

        tracing::info!(user_id = %user.id, "Login succeeded");

        Ok(LoginResponse {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.expires_in,
            user: UserResponse::from(user),
        })
    }

    /// 刷新令牌（旧令牌撤销，新令牌记录替换关系）
    pub async fn refresh_token(&self, req: RefreshTokenRequest) -> Result<TokenPair, AppError> {
        self.jwt_service.validate_refresh_token(&req.refresh_token)?;

        let auth_repo = AuthRepository::new(self.db.clone());
        let record = auth_repo
            .find_refresh_token_by_hash(&AuthRepository::hash_token(&req.refresh_token))
            .await?
            .ok_or(AppError::Unauthorized)?;

        if record.revoked_at.is_some() || record.expires_at < Utc::now() {
            return Err(AppError::Unauthorized);
        }

        let user = UserRepository::new(self.db.clone())
            .find_by_id(&record.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // 并发刷新时只有一个请求能撤销成功
        if !auth_repo.revoke_refresh_token(record.id).await? {
            return Err(AppError::Unauthorized);
        }

        self.issue_tokens(&user.id, &user.username, Some(record.id)).await
    }

    /// 当前用户
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        UserRepository::new(self.db.clone())
            .find_by_id(&user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn issue_tokens(
        &self,
        user_id: &Uuid,
        username: &str,
        replaces: Option<Uuid>,
    ) -> Result<TokenPair, AppError> {
        let token_pair = self.jwt_service.generate_token_pair(user_id, username)?;

        let now = Utc::now();
        let refresh_token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: AuthRepository::hash_token(&token_pair.refresh_token),
            user_id: *user_id,
            expires_at: now
                + chrono::Duration::seconds(self.jwt_service.refresh_token_exp_secs() as i64),
            revoked_at: None,
            rotated_from: replaces,
            created_at: now,
        };

        AuthRepository::new(self.db.clone())
            .store_refresh_token(&refresh_token)
            .await?;

        Ok(token_pair)
    }
}

//! HS256 access/refresh tokens

use crate::{config::SecurityConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which half of the token pair a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub token_type: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64, // seconds until access token expires
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
}

impl JwtService {
    /// Create JWT service from security config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let secret = config.jwt_secret.expose_secret();

        // HS256 needs at least 32 bytes of key material
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_exp_secs: config.access_token_exp_secs,
            refresh_token_exp_secs: config.refresh_token_exp_secs,
        })
    }

    pub fn refresh_token_exp_secs(&self) -> u64 {
        self.refresh_token_exp_secs
    }

    fn generate(
        &self,
        user_id: &Uuid,
        username: &str,
        kind: TokenKind,
        lifetime_secs: u64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(lifetime_secs as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type: kind,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(kind = ?kind, error = ?e, "Failed to encode token");
            AppError::Internal(format!("Failed to encode {:?} token: {}", kind, e))
        })
    }

    /// Generate access token
    pub fn generate_access_token(&self, user_id: &Uuid, username: &str) -> Result<String, AppError> {
        self.generate(user_id, username, TokenKind::Access, self.access_token_exp_secs)
    }

    /// Generate refresh token
    pub fn generate_refresh_token(&self, user_id: &Uuid, username: &str) -> Result<String, AppError> {
        self.generate(user_id, username, TokenKind::Refresh, self.refresh_token_exp_secs)
    }

    /// Generate token pair
    pub fn generate_token_pair(&self, user_id: &Uuid, username: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id, username)?,
            refresh_token: self.generate_refresh_token(user_id, username)?,
            expires_in: self.access_token_exp_secs,
        })
    }

    /// Validate and decode token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::Unauthorized
            })?
            .claims)
    }

    fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != expected {
            tracing::debug!(expected = ?expected, got = ?claims.token_type, "Token kind mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(claims)
    }

    /// Validate access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.validate_kind(token, TokenKind::Access)
    }

    /// Validate refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.validate_kind(token, TokenKind::Refresh)
    }
}

//! 认证：JWT、密码哈希、请求认证中间件

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService, TokenKind, TokenPair};
pub use middleware::{extract_token, jwt_auth_middleware, optional_auth_middleware, AuthContext};
pub use password::PasswordHasher;

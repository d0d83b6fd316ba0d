//! 密码哈希与密码策略测试

use medstock::auth::password::PasswordHasher;
use medstock::config::SecurityConfig;
use medstock::error::AppError;
use secrecy::Secret;

fn policy(require_special: bool) -> SecurityConfig {
    SecurityConfig {
        jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
        access_token_exp_secs: 900,
        refresh_token_exp_secs: 604800,
        password_min_length: 8,
        password_require_uppercase: true,
        password_require_digit: true,
        password_require_special: require_special,
        cors_allowed_origins: None,
    }
}

#[test]
fn test_hash_is_salted() {
    let hasher = PasswordHasher::new();
    let first = hasher.hash("TestPass123").unwrap();
    let second = hasher.hash("TestPass123").unwrap();

    assert_ne!(first, second);
    assert!(first.starts_with("$argon2id$"));
    hasher.verify("TestPass123", &first).unwrap();
    hasher.verify("TestPass123", &second).unwrap();
}

#[test]
fn test_low_cost_params_still_verify() {
    let hasher = PasswordHasher::with_params(8 * 1024, 1, 1);
    let hash = hasher.hash("TestPass123").unwrap();

    // 校验参数取自哈希串本身
    PasswordHasher::new().verify("TestPass123", &hash).unwrap();
}

#[test]
fn test_password_policy() {
    let strict = policy(true);
    let relaxed = policy(false);

    assert!(PasswordHasher::validate_password_policy("TestPass123", &relaxed).is_ok());
    assert!(PasswordHasher::validate_password_policy("TestPass123!", &strict).is_ok());

    let cases = [
        ("Short1", "Password must be at least 8 characters"),
        ("testpass123", "Password must contain at least one uppercase letter"),
        ("TestPassword", "Password must contain at least one digit"),
    ];
    for (password, expected) in cases {
        match PasswordHasher::validate_password_policy(password, &relaxed) {
            Err(AppError::Validation(message)) => assert_eq!(message, expected),
            other => panic!("{password}: unexpected {other:?}"),
        }
    }

    assert!(matches!(
        PasswordHasher::validate_password_policy("TestPass123", &strict),
        Err(AppError::Validation(_))
    ));
}

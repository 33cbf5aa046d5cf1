use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_SECRET", "supersecretjwtsecretforunittesting123");
    }
}

#[test]
fn test_sign_and_validate_round_trip() {
    set_env_vars();

    let token = sign_token(42, ROLE_ADMIN).expect("signing should succeed");
    let claims = validate_token(&token).expect("freshly signed token should pass");

    assert_eq!(claims.sub, "42");
    assert_eq!(claims.role, ROLE_ADMIN);
}

#[test]
fn test_validate_token_expired() {
    set_env_vars();
    let secret = "supersecretjwtsecretforunittesting123";
    let my_claims = Claims {
        sub: "42".to_string(),
        role: ROLE_CUSTOMER.to_string(),
        exp: 1, // past
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let result = validate_token(&token);
    assert!(result.is_err());
}

#[test]
fn test_validate_token_invalid_signature() {
    set_env_vars();
    let secret = "wrongsecret";
    let my_claims = Claims {
        sub: "42".to_string(),
        role: ROLE_CUSTOMER.to_string(),
        exp: 9999999999,
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let result = validate_token(&token);
    assert!(result.is_err());
}

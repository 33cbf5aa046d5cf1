use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::config_loader;

const TOKEN_TTL_HOURS: i64 = 24;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: String,
}

/// Admin-gated variant of [`AuthUser`]; extraction fails with 403 for any
/// other role.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin_id: i64,
}

#[derive(Debug, Clone)]
pub struct AuthCustomer {
    pub customer_id: i64,
}

pub fn sign_token(user_id: i64, role: &str) -> anyhow::Result<String> {
    let secret = config_loader::get_jwt_secret()?.secret;

    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn validate_token(token: &str) -> anyhow::Result<Claims> {
    let secret = config_loader::get_jwt_secret()?.secret;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

fn bearer_token(parts: &Parts) -> Result<&str, (StatusCode, String)> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header".to_string(),
        )
    })?;

    auth_str.strip_prefix("Bearer ").ok_or((
        StatusCode::UNAUTHORIZED,
        "Invalid Authorization header format".to_string(),
    ))
}

fn auth_user_from_parts(parts: &Parts) -> Result<AuthUser, (StatusCode, String)> {
    let token = bearer_token(parts)?;

    let claims =
        validate_token(token).map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user_id = claims.sub.parse::<i64>().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid user ID in token".to_string(),
        )
    })?;

    Ok(AuthUser {
        user_id,
        role: claims.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        auth_user_from_parts(parts)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = auth_user_from_parts(parts)?;

        if user.role != ROLE_ADMIN {
            return Err((StatusCode::FORBIDDEN, "Admin access required".to_string()));
        }

        Ok(AuthAdmin {
            admin_id: user.user_id,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthCustomer
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = auth_user_from_parts(parts)?;

        if user.role != ROLE_CUSTOMER {
            return Err((
                StatusCode::FORBIDDEN,
                "Customer access required".to_string(),
            ));
        }

        Ok(AuthCustomer {
            customer_id: user.user_id,
        })
    }
}

#[cfg(test)]
mod tests;

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use crates::domain::repositories::users::UserRepository;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::sign_token;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingField(_) => "missing_field",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUserDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

pub struct AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn login(&self, model: LoginModel) -> UseCaseResult<LoginResponse> {
        let username = model
            .username
            .filter(|value| !value.trim().is_empty())
            .ok_or(AuthError::MissingField("username"))?;
        let password = model
            .password
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingField("password"))?;

        let user = self
            .user_repo
            .find_by_username(username.clone())
            .await
            .map_err(|err| {
                error!(%username, db_error = ?err, "auth: failed to load user");
                AuthError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%username, "auth: login for unknown username");
                AuthError::InvalidCredentials
            })?;

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|err| {
            error!(user_id = user.id, hash_error = ?err, "auth: stored password hash is unparsable");
            AuthError::Internal(anyhow::anyhow!("invalid stored password hash"))
        })?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            warn!(user_id = user.id, "auth: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = sign_token(user.id, &user.role).map_err(AuthError::Internal)?;

        info!(user_id = user.id, role = %user.role, "auth: login succeeded");

        Ok(LoginResponse {
            token,
            user: LoginUserDto {
                id: user.id,
                username: user.username,
                email: user.email,
                role: user.role,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{
        PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };
    use chrono::Utc;
    use crates::domain::{entities::users::UserEntity, repositories::users::MockUserRepository};

    fn set_jwt_secret() {
        unsafe {
            std::env::set_var("JWT_SECRET", "supersecretjwtsecretforunittesting123");
        }
    }

    fn hashed(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn sample_user(password: &str) -> UserEntity {
        UserEntity {
            id: 9,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: hashed(password),
            role: "customer".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn login_with_correct_password_returns_token() {
        set_jwt_secret();

        let mut user_repo = MockUserRepository::new();
        let user = sample_user("hunter2");
        user_repo.expect_find_by_username().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let usecase = AuthUseCase::new(Arc::new(user_repo));

        let response = usecase
            .login(LoginModel {
                username: Some("alice".to_string()),
                password: Some("hunter2".to_string()),
            })
            .await
            .unwrap();

        assert!(!response.token.is_empty());
        assert_eq!(response.user.id, 9);
        assert_eq!(response.user.role, "customer");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        set_jwt_secret();

        let mut user_repo = MockUserRepository::new();
        let user = sample_user("hunter2");
        user_repo.expect_find_by_username().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let usecase = AuthUseCase::new(Arc::new(user_repo));

        let err = usecase
            .login(LoginModel {
                username: Some("alice".to_string()),
                password: Some("wrong".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_error_as_bad_password() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = AuthUseCase::new(Arc::new(user_repo));

        let err = usecase
            .login(LoginModel {
                username: Some("nobody".to_string()),
                password: Some("whatever".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.status_code().as_u16(), 401);
    }
}

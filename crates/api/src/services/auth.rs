//! Authentication service for registration and login.

use domain::models::board::social_board_name;
use domain::models::User;
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::config::JwtAuthConfig;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub access_token: String,
    pub expires_in: i64,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt_config: JwtConfig,
    initial_social_pins: i32,
}

impl AuthService {
    /// Creates a new AuthService with the given database pool and JWT configuration.
    pub fn new(
        pool: PgPool,
        jwt_config: &JwtAuthConfig,
        initial_social_pins: i32,
    ) -> Result<Self, AuthError> {
        let jwt = JwtConfig::new(
            &jwt_config.secret,
            jwt_config.access_token_expiry_secs,
            jwt_config.leeway_secs,
        )?;

        Ok(Self {
            users: UserRepository::new(pool),
            jwt_config: jwt,
            initial_social_pins,
        })
    }

    /// Registers an account with its starting social pins and social board.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthResult, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let display_name = display_name.trim();

        let created = self
            .users
            .create_with_social_board(
                email,
                &password_hash,
                display_name,
                self.initial_social_pins,
                &social_board_name(display_name),
            )
            .await;

        // Concurrent registration with the same email
        let (user, board) = match created {
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists)
            }
            other => other?,
        };

        info!(user_id = %user.id, board_id = %board.id, "User registered");
        self.issue_token(user.into())
    }

    /// Login with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token(user.into())
    }

    fn issue_token(&self, user: User) -> Result<AuthResult, AuthError> {
        let (access_token, _jti) = self.jwt_config.generate_access_token(user.id, &user.email)?;
        Ok(AuthResult {
            user,
            access_token,
            expires_in: self.jwt_config.access_token_expiry_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::EmailAlreadyExists.to_string(),
            "Email already registered"
        );
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_auth_error_from_jwt_error() {
        let err: AuthError = JwtError::InvalidToken.into();
        assert!(matches!(err, AuthError::TokenError(_)));
    }
}

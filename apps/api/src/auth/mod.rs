// Authentication module
// Password hashing and JWT access/refresh tokens

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Expected a {0} token")]
    WrongTokenType(jwt::TokenType),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

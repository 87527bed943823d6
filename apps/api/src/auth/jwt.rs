// JWT token creation and verification
// Access tokens expire after 8 hours, refresh tokens after 7 days

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::domain::user::{User, UserRole};

pub const ACCESS_TOKEN_TTL_HOURS: i64 = 8;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    fn ttl(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            TokenType::Refresh => Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user_id)
/// * `company_id` - The user's company
/// * `role` - The user's role at issue time
/// * `token_type` - Access or refresh
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub role: UserRole,
    pub token_type: TokenType,
    pub exp: usize,
}

/// Access and refresh tokens issued together at login or refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Creates a signed token for a user
///
/// # Token Properties
/// - Signed with HS256 algorithm
/// - Contains user_id in 'sub' claim plus company and role
///
/// # Example
/// ```
/// use esg_platform_api::auth::jwt::{create_token, TokenType};
/// use esg_platform_api::domain::user::UserRole;
/// use uuid::Uuid;
///
/// let token = create_token(Uuid::new_v4(), Uuid::new_v4(), UserRole::Viewer, TokenType::Access, "secret")
///     .expect("valid token");
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn create_token(
    user_id: Uuid,
    company_id: Uuid,
    role: UserRole,
    token_type: TokenType,
    secret: &str,
) -> Result<String, AuthError> {
    let expiry = Utc::now() + token_type.ttl();
    let claims = Claims {
        sub: user_id,
        company_id,
        role,
        token_type,
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

/// Issues an access/refresh pair for `user`
pub fn create_token_pair(user: &User, secret: &str) -> Result<TokenPair, AuthError> {
    let issue = |token_type| create_token(user.id(), user.company_id(), user.role(), token_type, secret);
    Ok(TokenPair {
        access_token: issue(TokenType::Access)?,
        refresh_token: issue(TokenType::Refresh)?,
        expires_in: TokenType::Access.ttl().num_seconds(),
    })
}

/// Verifies and decodes a token, requiring the expected token type
///
/// # Returns
/// * `Ok(Claims)` - The decoded claims if token is valid
/// * `Err(AuthError)` - If the token is invalid, expired or of the wrong type
pub fn verify_token(token: &str, secret: &str, expected: TokenType) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    if claims.token_type != expected {
        return Err(AuthError::WrongTokenType(expected));
    }
    Ok(claims)
}

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, ok, ApiResponse};
use crate::auth::jwt::{create_token_pair, verify_token, TokenPair, TokenType};
use crate::auth::password::{hash_password, verify_password};
use crate::domain::user::{Email, NewUser, User, UserRole};
use crate::domain::validation::as_object;
use crate::state::AppState;

use super::active_company;

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for exchanging a refresh token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Register a new employee account
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let mut new_user = NewUser::from_payload(as_object(&body)?)?;
    // Self-registration never grants elevated roles
    new_user.role = UserRole::Employee;

    active_company(&state, new_user.company_id).await?;
    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&new_user.password)?;
    let user = User::new(new_user, password_hash);
    state.users.save(&user).await?;

    tracing::info!(user_id = %user.id(), company_id = %user.company_id(), "User registered");
    Ok(created(user, "User registered successfully"))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let invalid = || ApiError::unauthorized("Invalid credentials");

    let email = Email::new(req.email).map_err(|_| invalid())?;
    let mut user = state.users.find_by_email(&email).await?.ok_or_else(invalid)?;

    if !verify_password(&req.password, user.password_hash()) {
        return Err(invalid());
    }
    if !user.is_active() {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    user.record_login();
    state.users.save(&user).await?;

    let tokens = create_token_pair(&user, &state.config.jwt_secret)?;
    tracing::info!(user_id = %user.id(), "User logged in");

    Ok(ok(LoginResponse { user, tokens }, "Login successful"))
}

/// Exchange a refresh token for a new token pair
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let claims = verify_token(&req.refresh_token, &state.config.jwt_secret, TokenType::Refresh)?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .filter(User::is_active)
        .ok_or_else(|| ApiError::unauthorized("Account is disabled"))?;

    let tokens = create_token_pair(&user, &state.config.jwt_secret)?;
    Ok(ok(tokens, "Token refreshed"))
}

/// Logout
///
/// Tokens are stateless; clients discard them.
///
/// POST /api/v1/auth/logout
pub async fn logout(JwtAuth(claims): JwtAuth) -> StatusCode {
    tracing::info!(user_id = %claims.sub, "User logged out");
    StatusCode::NO_CONTENT
}

/// Profile of the authenticated user
///
/// GET /api/v1/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ok(user, "Profile retrieved"))
}

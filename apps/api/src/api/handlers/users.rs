use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, list, ok, ApiResponse, ListResponse};
use crate::auth::password::hash_password;
use crate::domain::repositories::UserFilter;
use crate::domain::user::{NewUser, User, UserChanges, UserRole};
use crate::domain::validation::as_object;
use crate::state::AppState;

use super::{active_company, existing_company, page_request, parse_filter};

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub company_id: Option<Uuid>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

async fn find_user(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))
}

/// Refuses to grant a role above the caller's own
fn check_role_grant(granted_by: UserRole, role: UserRole) -> Result<(), ApiError> {
    if !granted_by.can_assign(role) {
        return Err(ApiError::forbidden(format!(
            "A {} cannot assign the {} role",
            granted_by, role
        )));
    }
    Ok(())
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<ListResponse<User>>, ApiError> {
    let filter = UserFilter {
        company_id: query.company_id,
        role: parse_filter::<UserRole>("role", query.role.as_deref())?,
        is_active: query.is_active,
    };
    let page = state
        .users
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Users retrieved"))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let new_user = NewUser::from_payload(as_object(&body)?)?;
    check_role_grant(claims.role, new_user.role)?;
    active_company(&state, new_user.company_id).await?;
    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&new_user.password)?;
    let user = User::new(new_user, password_hash);
    state.users.save(&user).await?;

    tracing::info!(user_id = %user.id(), created_by = %claims.sub, "User created");
    Ok(created(user, "User created successfully"))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = find_user(&state, id).await?;
    Ok(ok(user, "User retrieved"))
}

/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let changes = UserChanges::from_payload(as_object(&body)?)?;
    if let Some(role) = changes.role {
        check_role_grant(claims.role, role)?;
    }
    let mut user = find_user(&state, id).await?;

    // Users of a deactivated company stay inactive
    if changes.is_active == Some(true) && !user.is_active() {
        let company = existing_company(&state, user.company_id()).await?;
        if !company.is_active() {
            return Err(ApiError::conflict(format!(
                "Company {} is inactive",
                company.id()
            )));
        }
    }

    if let Some(email) = &changes.email {
        let taken = state
            .users
            .find_by_email(email)
            .await?
            .is_some_and(|other| other.id() != id);
        if taken {
            return Err(ApiError::conflict("Email already registered"));
        }
    }

    user.apply(changes);
    state.users.save(&user).await?;

    tracing::info!(user_id = %id, "User updated");
    Ok(ok(user, "User updated successfully"))
}

/// Deactivates a user; the account and its history are kept
///
/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut user = find_user(&state, id).await?;
    user.deactivate();
    state.users.save(&user).await?;

    tracing::info!(user_id = %id, by = %claims.sub, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

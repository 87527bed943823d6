use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, list, ok, ApiResponse, ListResponse};
use crate::domain::company::{Company, CompanyChanges, CompanySize, NewCompany};
use crate::domain::catalog::Industry;
use crate::domain::repositories::CompanyFilter;
use crate::domain::validation::as_object;
use crate::state::AppState;

use super::{existing_company, page_request, parse_filter};

/// Query parameters for listing companies
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// GET /api/v1/companies
pub async fn list_companies(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiQuery(query): ApiQuery<CompanyListQuery>,
) -> Result<Json<ListResponse<Company>>, ApiError> {
    let filter = CompanyFilter {
        industry: parse_filter::<Industry>("industry", query.industry.as_deref())?,
        size: parse_filter::<CompanySize>("size", query.size.as_deref())?,
        is_active: query.is_active,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let page = state
        .companies
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Companies retrieved"))
}

/// POST /api/v1/companies
pub async fn create_company(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Company>>), ApiError> {
    let new_company = NewCompany::from_payload(as_object(&body)?)?;
    if state.companies.find_by_nip(&new_company.nip).await?.is_some() {
        return Err(ApiError::conflict("A company with this NIP already exists"));
    }

    let company = Company::new(new_company);
    state.companies.save(&company).await?;

    tracing::info!(company_id = %company.id(), created_by = %claims.sub, "Company created");
    Ok(created(company, "Company created successfully"))
}

/// GET /api/v1/companies/:id
pub async fn get_company(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    let company = existing_company(&state, id).await?;
    Ok(ok(company, "Company retrieved"))
}

/// PUT /api/v1/companies/:id
pub async fn update_company(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    let changes = CompanyChanges::from_payload(as_object(&body)?)?;
    let mut company = existing_company(&state, id).await?;

    if let Some(nip) = changes.nip() {
        let taken = state
            .companies
            .find_by_nip(nip)
            .await?
            .is_some_and(|other| other.id() != id);
        if taken {
            return Err(ApiError::conflict("A company with this NIP already exists"));
        }
    }

    company.apply(changes);
    state.companies.save(&company).await?;

    tracing::info!(company_id = %id, "Company updated");
    Ok(ok(company, "Company updated successfully"))
}

/// Deactivates the company and every user it owns
///
/// DELETE /api/v1/companies/:id
pub async fn delete_company(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let users = state.companies.deactivate(id).await?;

    tracing::info!(
        company_id = %id,
        deactivated_users = users,
        by = %claims.sub,
        "Company deactivated"
    );
    Ok(StatusCode::NO_CONTENT)
}

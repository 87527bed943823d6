// HTTP handlers, one module per resource

pub mod auth;
pub mod companies;
pub mod esg_metrics;
pub mod health;
pub mod reports;
pub mod surveys;
pub mod tasks;
pub mod users;

use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::domain::catalog::Enumerated;
use crate::domain::company::Company;
use crate::domain::pagination::PageRequest;
use crate::domain::validation::{ValidationError, ValidationErrors};
use crate::state::AppState;

/// Parses an optional enumerated query filter
pub(crate) fn parse_filter<E: Enumerated>(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<E>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => E::parse(value).map(Some).ok_or_else(|| {
            ValidationErrors::single(ValidationError::not_allowed(field, E::allowed_values())).into()
        }),
    }
}

pub(crate) fn page_request(page: Option<i64>, limit: Option<i64>) -> Result<PageRequest, ApiError> {
    Ok(PageRequest::new(page, limit)?)
}

/// Loads a company, failing with 404 if it does not exist
pub(crate) async fn existing_company(state: &AppState, id: Uuid) -> Result<Company, ApiError> {
    state
        .companies
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Company {} not found", id)))
}

/// Loads a company that may receive new child records
///
/// Inactive companies keep their history but reject new children with 409.
pub(crate) async fn active_company(state: &AppState, id: Uuid) -> Result<Company, ApiError> {
    let company = existing_company(state, id).await?;
    if !company.is_active() {
        return Err(ApiError::conflict(format!("Company {} is inactive", id)));
    }
    Ok(company)
}

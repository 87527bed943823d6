use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, list, ok, ApiResponse, ListResponse};
use crate::domain::esg_metric::{EsgCategory, EsgMetric, EsgMetricChanges, NewEsgMetric};
use crate::domain::pagination::PageQuery;
use crate::domain::reporting::{aggregate_by_category, CategoryAggregate};
use crate::domain::repositories::EsgMetricFilter;
use crate::domain::validation::{as_object, ValidationError, ValidationErrors};
use crate::state::AppState;

use super::{active_company, existing_company, page_request, parse_filter};

/// Query parameters for listing metrics
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub company_id: Option<Uuid>,
    pub category: Option<String>,
    pub period: Option<String>,
    pub verified: Option<bool>,
}

/// Query parameters for the category summary
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub period: Option<String>,
}

async fn find_metric(state: &AppState, id: Uuid) -> Result<EsgMetric, ApiError> {
    state
        .metrics
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("ESG metric {} not found", id)))
}

/// GET /api/v1/esg-metrics
pub async fn list_metrics(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiQuery(query): ApiQuery<MetricListQuery>,
) -> Result<Json<ListResponse<EsgMetric>>, ApiError> {
    let filter = EsgMetricFilter {
        company_id: query.company_id,
        category: parse_filter::<EsgCategory>("category", query.category.as_deref())?,
        period: query.period,
        verified: query.verified,
    };
    let page = state
        .metrics
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "ESG metrics retrieved"))
}

/// POST /api/v1/esg-metrics
pub async fn create_metric(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<EsgMetric>>), ApiError> {
    let new_metric = NewEsgMetric::from_payload(as_object(&body)?)?;
    active_company(&state, new_metric.company_id).await?;

    let metric = EsgMetric::new(new_metric);
    state.metrics.save(&metric).await?;

    tracing::info!(
        metric_id = %metric.id(),
        company_id = %metric.company_id(),
        created_by = %claims.sub,
        "ESG metric recorded"
    );
    Ok(created(metric, "ESG metric created successfully"))
}

/// GET /api/v1/esg-metrics/:id
pub async fn get_metric(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<EsgMetric>>, ApiError> {
    let metric = find_metric(&state, id).await?;
    Ok(ok(metric, "ESG metric retrieved"))
}

/// PUT /api/v1/esg-metrics/:id
pub async fn update_metric(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<EsgMetric>>, ApiError> {
    let changes = EsgMetricChanges::from_payload(as_object(&body)?)?;
    let mut metric = find_metric(&state, id).await?;

    metric.apply(changes)?;
    state.metrics.save(&metric).await?;

    tracing::info!(metric_id = %id, "ESG metric updated");
    Ok(ok(metric, "ESG metric updated successfully"))
}

/// DELETE /api/v1/esg-metrics/:id
pub async fn delete_metric(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.metrics.delete(id).await?;

    tracing::info!(metric_id = %id, by = %claims.sub, "ESG metric deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/esg-metrics/company/:companyId
pub async fn list_company_metrics(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ListResponse<EsgMetric>>, ApiError> {
    existing_company(&state, company_id).await?;

    let filter = EsgMetricFilter {
        company_id: Some(company_id),
        ..EsgMetricFilter::default()
    };
    let page = state
        .metrics
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "ESG metrics retrieved"))
}

/// Category totals for one company and period
///
/// GET /api/v1/esg-metrics/company/:companyId/summary?period=
pub async fn company_summary(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<ApiResponse<CategoryAggregate>>, ApiError> {
    let period = query
        .period
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ValidationErrors::single(ValidationError::missing("period")))?;
    existing_company(&state, company_id).await?;

    let metrics = state.metrics.find_for_period(company_id, &period).await?;
    let summary = aggregate_by_category(&metrics, company_id, &period)?;

    Ok(ok(summary, "ESG summary calculated"))
}

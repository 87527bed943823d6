use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, list, ok, ApiResponse, ListResponse};
use crate::domain::report::{NewReport, Report, ReportChanges, ReportStatus, ReportType};
use crate::domain::reporting::{export_csv, export_file_name, generate_report, GenerateReportRequest};
use crate::domain::repositories::ReportFilter;
use crate::domain::validation::as_object;
use crate::state::AppState;

use super::{active_company, page_request, parse_filter};

/// Query parameters for listing reports
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub company_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub status: Option<String>,
    pub period: Option<String>,
}

async fn find_report(state: &AppState, id: Uuid) -> Result<Report, ApiError> {
    state
        .reports
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Report {} not found", id)))
}

/// GET /api/v1/reports
pub async fn list_reports(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiQuery(query): ApiQuery<ReportListQuery>,
) -> Result<Json<ListResponse<Report>>, ApiError> {
    let filter = ReportFilter {
        company_id: query.company_id,
        report_type: parse_filter::<ReportType>("type", query.report_type.as_deref())?,
        status: parse_filter::<ReportStatus>("status", query.status.as_deref())?,
        period: query.period,
    };
    let page = state
        .reports
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Reports retrieved"))
}

/// Create a report by hand
///
/// POST /api/v1/reports
pub async fn create_report(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Report>>), ApiError> {
    let new_report = NewReport::from_payload(as_object(&body)?)?;
    active_company(&state, new_report.company_id).await?;

    let report = Report::new(new_report, claims.sub);
    state.reports.save(&report).await?;

    tracing::info!(report_id = %report.id(), company_id = %report.company_id(), "Report created");
    Ok(created(report, "Report created successfully"))
}

/// Derive a DRAFT report from the company's metrics
///
/// POST /api/v1/reports/generate
pub async fn generate(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Report>>), ApiError> {
    let request = GenerateReportRequest::from_payload(as_object(&body)?, claims.sub)?;
    let company = active_company(&state, request.company_id).await?;

    let metrics = state
        .metrics
        .find_for_period(company.id(), &request.period)
        .await?;
    let report = generate_report(&request, &company, &metrics, &state.selection_policy)?;
    state.reports.save(&report).await?;

    tracing::info!(
        report_id = %report.id(),
        company_id = %company.id(),
        report_type = %report.report_type(),
        period = %report.period(),
        metrics = metrics.len(),
        "Report generated"
    );
    Ok(created(report, "Report generated successfully"))
}

/// GET /api/v1/reports/:id
pub async fn get_report(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Report>>, ApiError> {
    let report = find_report(&state, id).await?;
    Ok(ok(report, "Report retrieved"))
}

/// PUT /api/v1/reports/:id
pub async fn update_report(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<Report>>, ApiError> {
    let changes = ReportChanges::from_payload(as_object(&body)?)?;
    let mut report = find_report(&state, id).await?;

    report.apply(changes)?;
    state.reports.save(&report).await?;

    tracing::info!(report_id = %id, status = %report.status(), "Report updated");
    Ok(ok(report, "Report updated successfully"))
}

/// DELETE /api/v1/reports/:id
pub async fn delete_report(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.reports.delete(id).await?;

    tracing::info!(report_id = %id, by = %claims.sub, "Report deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Download the report's metric lines as CSV
///
/// GET /api/v1/reports/:id/export
pub async fn export_report(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = find_report(&state, id).await?;
    let body = export_csv(&report)?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export_file_name(&report)),
        ),
    ];
    Ok((headers, body))
}

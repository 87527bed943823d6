use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, list, ok, ApiResponse, ListResponse};
use crate::domain::pagination::PageQuery;
use crate::domain::repositories::SurveyFilter;
use crate::domain::survey::{NewSurvey, Survey, SurveyChanges, SurveyResponse, SurveyStatus, SurveyType};
use crate::domain::validation::reader::present;
use crate::domain::validation::{as_object, Mode, PayloadReader, Presence};
use crate::state::AppState;

use super::{active_company, page_request, parse_filter};

/// Query parameters for listing surveys
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub company_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub survey_type: Option<String>,
    pub status: Option<String>,
}

async fn find_survey(state: &AppState, id: Uuid) -> Result<Survey, ApiError> {
    state
        .surveys
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Survey {} not found", id)))
}

/// GET /api/v1/surveys
pub async fn list_surveys(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiQuery(query): ApiQuery<SurveyListQuery>,
) -> Result<Json<ListResponse<Survey>>, ApiError> {
    let filter = SurveyFilter {
        company_id: query.company_id,
        survey_type: parse_filter::<SurveyType>("type", query.survey_type.as_deref())?,
        status: parse_filter::<SurveyStatus>("status", query.status.as_deref())?,
    };
    let page = state
        .surveys
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Surveys retrieved"))
}

/// POST /api/v1/surveys
pub async fn create_survey(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Survey>>), ApiError> {
    let new_survey = NewSurvey::from_payload(as_object(&body)?)?;
    active_company(&state, new_survey.company_id).await?;

    let survey = Survey::new(new_survey);
    state.surveys.save(&survey).await?;

    tracing::info!(survey_id = %survey.id(), created_by = %claims.sub, "Survey created");
    Ok(created(survey, "Survey created successfully"))
}

/// GET /api/v1/surveys/:id
pub async fn get_survey(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Survey>>, ApiError> {
    let survey = find_survey(&state, id).await?;
    Ok(ok(survey, "Survey retrieved"))
}

/// PUT /api/v1/surveys/:id
pub async fn update_survey(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<Survey>>, ApiError> {
    let changes = SurveyChanges::from_payload(as_object(&body)?)?;
    let mut survey = find_survey(&state, id).await?;

    survey.apply(changes)?;
    state.surveys.save(&survey).await?;

    tracing::info!(survey_id = %id, status = %survey.status(), "Survey updated");
    Ok(ok(survey, "Survey updated successfully"))
}

/// Deletes a survey together with its responses
///
/// DELETE /api/v1/surveys/:id
pub async fn delete_survey(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.surveys.delete(id).await?;

    tracing::info!(survey_id = %id, by = %claims.sub, "Survey deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/surveys/:id/responses
pub async fn list_responses(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ListResponse<SurveyResponse>>, ApiError> {
    find_survey(&state, id).await?;
    let page = state
        .surveys
        .list_responses(id, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Survey responses retrieved"))
}

/// Submit an answer set; only ACTIVE surveys inside their window accept one
///
/// POST /api/v1/surveys/:id/responses
pub async fn submit_response(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<SurveyResponse>>), ApiError> {
    let mut r = PayloadReader::new(as_object(&body)?, Mode::Create);
    let answers = r.object("answers", Presence::Required);
    r.finish()?;
    let answers = present(answers, "answers")?;

    let survey = find_survey(&state, id).await?;
    let response = survey.accept_response(claims.sub, answers, Utc::now())?;
    state.surveys.save_response(&response).await?;

    tracing::info!(survey_id = %id, response_id = %response.id, "Survey response submitted");
    Ok(created(response, "Survey response submitted"))
}

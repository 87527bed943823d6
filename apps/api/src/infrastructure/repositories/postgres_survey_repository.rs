use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{database_error, limit_offset, total};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::{RepositoryError, RepositoryResult, SurveyFilter, SurveyRepository};
use crate::domain::survey::{Survey, SurveyResponse, SurveyStatus, SurveyType};

const COLUMNS: &str = r#"
    id, company_id, title, description, survey_type, status,
    start_date, end_date, is_anonymous, created_at, updated_at
"#;

const FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR company_id = $1)
      AND ($2::survey_type IS NULL OR survey_type = $2)
      AND ($3::survey_status IS NULL OR status = $3)
"#;

#[derive(sqlx::FromRow)]
struct SurveyRow {
    id: Uuid,
    company_id: Uuid,
    title: String,
    description: Option<String>,
    survey_type: SurveyType,
    status: SurveyStatus,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    is_anonymous: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SurveyRow> for Survey {
    fn from(r: SurveyRow) -> Self {
        Survey::from_persistence(
            r.id,
            r.company_id,
            r.title,
            r.description,
            r.survey_type,
            r.status,
            r.start_date,
            r.end_date,
            r.is_anonymous,
            r.created_at,
            r.updated_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct SurveyResponseRow {
    id: Uuid,
    survey_id: Uuid,
    respondent_id: Option<Uuid>,
    answers: Value,
    submitted_at: DateTime<Utc>,
}

impl From<SurveyResponseRow> for SurveyResponse {
    fn from(r: SurveyResponseRow) -> Self {
        SurveyResponse {
            id: r.id,
            survey_id: r.survey_id,
            respondent_id: r.respondent_id,
            answers: r.answers,
            submitted_at: r.submitted_at,
        }
    }
}

/// PostgreSQL implementation of SurveyRepository
pub struct PostgresSurveyRepository {
    pool: PgPool,
}

impl PostgresSurveyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyRepository for PostgresSurveyRepository {
    async fn save(&self, survey: &Survey) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO surveys (
                id, company_id, title, description, survey_type, status,
                start_date, end_date, is_anonymous, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                survey_type = EXCLUDED.survey_type,
                status = EXCLUDED.status,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                is_anonymous = EXCLUDED.is_anonymous,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(survey.id())
        .bind(survey.company_id())
        .bind(survey.title())
        .bind(survey.description())
        .bind(survey.survey_type())
        .bind(survey.status())
        .bind(survey.start_date())
        .bind(survey.end_date())
        .bind(survey.is_anonymous())
        .bind(survey.created_at())
        .bind(survey.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save survey", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Survey>> {
        let row: Option<SurveyRow> =
            sqlx::query_as(&format!("SELECT {} FROM surveys WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to find survey by id", e))?;

        Ok(row.map(Survey::from))
    }

    async fn list(&self, filter: &SurveyFilter, page: PageRequest) -> RepositoryResult<Page<Survey>> {
        let (limit, offset) = limit_offset(page);

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM surveys {}", FILTER))
            .bind(filter.company_id)
            .bind(filter.survey_type)
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count surveys", e))?;

        let rows: Vec<SurveyRow> = sqlx::query_as(&format!(
            "SELECT {} FROM surveys {} ORDER BY created_at DESC, id LIMIT $4 OFFSET $5",
            COLUMNS, FILTER
        ))
        .bind(filter.company_id)
        .bind(filter.survey_type)
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list surveys", e))?;

        Ok(Page::from_parts(
            rows.into_iter().map(Survey::from).collect(),
            total(count),
            page,
        ))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        // Responses go with the survey through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete survey", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Survey", id));
        }
        Ok(())
    }

    async fn save_response(&self, response: &SurveyResponse) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO survey_responses (id, survey_id, respondent_id, answers, submitted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(response.id)
        .bind(response.survey_id)
        .bind(response.respondent_id)
        .bind(&response.answers)
        .bind(response.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save survey response", e))?;

        Ok(())
    }

    async fn list_responses(&self, survey_id: Uuid, page: PageRequest) -> RepositoryResult<Page<SurveyResponse>> {
        let (limit, offset) = limit_offset(page);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM survey_responses WHERE survey_id = $1")
            .bind(survey_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count survey responses", e))?;

        let rows: Vec<SurveyResponseRow> = sqlx::query_as(
            r#"
            SELECT id, survey_id, respondent_id, answers, submitted_at
            FROM survey_responses
            WHERE survey_id = $1
            ORDER BY submitted_at, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(survey_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list survey responses", e))?;

        Ok(Page::from_parts(
            rows.into_iter().map(SurveyResponse::from).collect(),
            total(count),
            page,
        ))
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{database_error, limit_offset, total};
use crate::domain::catalog::Framework;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::report::{Report, ReportContent, ReportStatus, ReportType};
use crate::domain::repositories::{ReportFilter, ReportRepository, RepositoryError, RepositoryResult};

const COLUMNS: &str = r#"
    id, company_id, title, report_type, framework, period, status, content,
    file_url, published_at, created_by_id, created_at, updated_at
"#;

const FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR company_id = $1)
      AND ($2::report_type IS NULL OR report_type = $2)
      AND ($3::report_status IS NULL OR status = $3)
      AND ($4::text IS NULL OR period = $4)
"#;

fn corrupt(reason: impl ToString) -> RepositoryError {
    RepositoryError::Corrupt {
        entity: "report",
        reason: reason.to_string(),
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    company_id: Uuid,
    title: String,
    report_type: ReportType,
    framework: Option<Framework>,
    period: String,
    status: ReportStatus,
    content: Option<Value>,
    file_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = RepositoryError;

    fn try_from(r: ReportRow) -> Result<Self, Self::Error> {
        let content = r
            .content
            .map(serde_json::from_value::<ReportContent>)
            .transpose()
            .map_err(corrupt)?;

        Ok(Report::from_persistence(
            r.id,
            r.company_id,
            r.title,
            r.report_type,
            r.framework,
            r.period,
            r.status,
            content,
            r.file_url,
            r.published_at,
            r.created_by_id,
            r.created_at,
            r.updated_at,
        ))
    }
}

/// PostgreSQL implementation of ReportRepository
///
/// Report content is stored as JSONB in its tagged form.
pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn save(&self, report: &Report) -> RepositoryResult<()> {
        let content = report
            .content()
            .map(serde_json::to_value)
            .transpose()
            .map_err(corrupt)?;

        sqlx::query(
            r#"
            INSERT INTO reports (
                id, company_id, title, report_type, framework, period, status, content,
                file_url, published_at, created_by_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                framework = EXCLUDED.framework,
                period = EXCLUDED.period,
                status = EXCLUDED.status,
                content = EXCLUDED.content,
                file_url = EXCLUDED.file_url,
                published_at = EXCLUDED.published_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(report.id())
        .bind(report.company_id())
        .bind(report.title())
        .bind(report.report_type())
        .bind(report.framework())
        .bind(report.period())
        .bind(report.status())
        .bind(content)
        .bind(report.file_url())
        .bind(report.published_at())
        .bind(report.created_by_id())
        .bind(report.created_at())
        .bind(report.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save report", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Report>> {
        let row: Option<ReportRow> =
            sqlx::query_as(&format!("SELECT {} FROM reports WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to find report by id", e))?;

        row.map(Report::try_from).transpose()
    }

    async fn list(&self, filter: &ReportFilter, page: PageRequest) -> RepositoryResult<Page<Report>> {
        let (limit, offset) = limit_offset(page);

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reports {}", FILTER))
            .bind(filter.company_id)
            .bind(filter.report_type)
            .bind(filter.status)
            .bind(filter.period.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count reports", e))?;

        let rows: Vec<ReportRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reports {} ORDER BY created_at DESC, id LIMIT $5 OFFSET $6",
            COLUMNS, FILTER
        ))
        .bind(filter.company_id)
        .bind(filter.report_type)
        .bind(filter.status)
        .bind(filter.period.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list reports", e))?;

        let reports = rows
            .into_iter()
            .map(Report::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::from_parts(reports, total(count), page))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete report", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Report", id));
        }
        Ok(())
    }
}

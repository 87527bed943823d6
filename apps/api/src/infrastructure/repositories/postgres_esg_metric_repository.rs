use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{database_error, limit_offset, total};
use crate::domain::esg_metric::{EsgCategory, EsgMetric};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::{
    EsgMetricFilter, EsgMetricRepository, RepositoryError, RepositoryResult,
};

const COLUMNS: &str = r#"
    id, company_id, category, metric_type, name, value, unit, period,
    source, verified, notes, created_at, updated_at
"#;

const FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR company_id = $1)
      AND ($2::esg_category IS NULL OR category = $2)
      AND ($3::text IS NULL OR period = $3)
      AND ($4::boolean IS NULL OR verified = $4)
"#;

#[derive(sqlx::FromRow)]
struct EsgMetricRow {
    id: Uuid,
    company_id: Uuid,
    category: EsgCategory,
    metric_type: String,
    name: String,
    value: Decimal,
    unit: String,
    period: String,
    source: Option<String>,
    verified: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EsgMetricRow> for EsgMetric {
    fn from(r: EsgMetricRow) -> Self {
        EsgMetric::from_persistence(
            r.id,
            r.company_id,
            r.category,
            r.metric_type,
            r.name,
            r.value,
            r.unit,
            r.period,
            r.source,
            r.verified,
            r.notes,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL implementation of EsgMetricRepository
///
/// Values are stored as NUMERIC so sums stay exact.
pub struct PostgresEsgMetricRepository {
    pool: PgPool,
}

impl PostgresEsgMetricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EsgMetricRepository for PostgresEsgMetricRepository {
    async fn save(&self, metric: &EsgMetric) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO esg_metrics (
                id, company_id, category, metric_type, name, value, unit, period,
                source, verified, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                category = EXCLUDED.category,
                metric_type = EXCLUDED.metric_type,
                name = EXCLUDED.name,
                value = EXCLUDED.value,
                unit = EXCLUDED.unit,
                period = EXCLUDED.period,
                source = EXCLUDED.source,
                verified = EXCLUDED.verified,
                notes = EXCLUDED.notes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(metric.id())
        .bind(metric.company_id())
        .bind(metric.category())
        .bind(metric.metric_type())
        .bind(metric.name())
        .bind(metric.value())
        .bind(metric.unit())
        .bind(metric.period())
        .bind(metric.source())
        .bind(metric.verified())
        .bind(metric.notes())
        .bind(metric.created_at())
        .bind(metric.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save metric", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<EsgMetric>> {
        let row: Option<EsgMetricRow> =
            sqlx::query_as(&format!("SELECT {} FROM esg_metrics WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to find metric by id", e))?;

        Ok(row.map(EsgMetric::from))
    }

    async fn list(&self, filter: &EsgMetricFilter, page: PageRequest) -> RepositoryResult<Page<EsgMetric>> {
        let (limit, offset) = limit_offset(page);

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM esg_metrics {}", FILTER))
            .bind(filter.company_id)
            .bind(filter.category)
            .bind(filter.period.as_deref())
            .bind(filter.verified)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count metrics", e))?;

        let rows: Vec<EsgMetricRow> = sqlx::query_as(&format!(
            "SELECT {} FROM esg_metrics {} ORDER BY created_at DESC, id LIMIT $5 OFFSET $6",
            COLUMNS, FILTER
        ))
        .bind(filter.company_id)
        .bind(filter.category)
        .bind(filter.period.as_deref())
        .bind(filter.verified)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list metrics", e))?;

        Ok(Page::from_parts(
            rows.into_iter().map(EsgMetric::from).collect(),
            total(count),
            page,
        ))
    }

    async fn find_for_period(&self, company_id: Uuid, period: &str) -> RepositoryResult<Vec<EsgMetric>> {
        let rows: Vec<EsgMetricRow> = sqlx::query_as(&format!(
            "SELECT {} FROM esg_metrics WHERE company_id = $1 AND period = $2 ORDER BY category, name",
            COLUMNS
        ))
        .bind(company_id)
        .bind(period)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load metrics for period", e))?;

        Ok(rows.into_iter().map(EsgMetric::from).collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM esg_metrics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete metric", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("ESG metric", id));
        }
        Ok(())
    }
}

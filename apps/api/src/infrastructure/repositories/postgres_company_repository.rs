use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{database_error, limit_offset, total};
use crate::domain::catalog::{Country, Enumerated, Industry};
use crate::domain::company::{Company, CompanySize, Nip, Regon};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::{
    CompanyFilter, CompanyRepository, RepositoryError, RepositoryResult,
};

const COLUMNS: &str = r#"
    id, name, nip, regon, industry, size, website, description, is_active,
    street, city, postal_code, country, created_at, updated_at
"#;

const FILTER: &str = r#"
    WHERE ($1::text IS NULL OR industry = $1)
      AND ($2::company_size IS NULL OR size = $2)
      AND ($3::boolean IS NULL OR is_active = $3)
      AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')
"#;

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    nip: String,
    regon: Option<String>,
    industry: String,
    size: CompanySize,
    website: Option<String>,
    description: Option<String>,
    is_active: bool,
    street: String,
    city: String,
    postal_code: String,
    country: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = RepositoryError;

    fn try_from(r: CompanyRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| RepositoryError::Corrupt {
            entity: "company",
            reason,
        };
        let nip = Nip::new(&r.nip).map_err(corrupt)?;
        let regon = r.regon.as_deref().map(Regon::new).transpose().map_err(corrupt)?;
        let industry = Industry::parse(&r.industry)
            .ok_or_else(|| corrupt(format!("unknown industry {}", r.industry)))?;
        let country = Country::parse(&r.country)
            .ok_or_else(|| corrupt(format!("unknown country {}", r.country)))?;

        Ok(Company::from_persistence(
            r.id,
            r.name,
            nip,
            regon,
            industry,
            r.size,
            r.website,
            r.description,
            r.is_active,
            r.street,
            r.city,
            r.postal_code,
            country,
            r.created_at,
            r.updated_at,
        ))
    }
}

/// PostgreSQL implementation of CompanyRepository
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn save(&self, company: &Company) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (
                id, name, nip, regon, industry, size, website, description, is_active,
                street, city, postal_code, country, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                nip = EXCLUDED.nip,
                regon = EXCLUDED.regon,
                industry = EXCLUDED.industry,
                size = EXCLUDED.size,
                website = EXCLUDED.website,
                description = EXCLUDED.description,
                is_active = EXCLUDED.is_active,
                street = EXCLUDED.street,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                country = EXCLUDED.country,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(company.id())
        .bind(company.name())
        .bind(company.nip().as_str())
        .bind(company.regon().map(|r| r.as_str()))
        .bind(company.industry().as_str())
        .bind(company.size())
        .bind(company.website())
        .bind(company.description())
        .bind(company.is_active())
        .bind(company.street())
        .bind(company.city())
        .bind(company.postal_code())
        .bind(company.country().as_str())
        .bind(company.created_at())
        .bind(company.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save company", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Company>> {
        let row: Option<CompanyRow> =
            sqlx::query_as(&format!("SELECT {} FROM companies WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to find company by id", e))?;

        row.map(Company::try_from).transpose()
    }

    async fn find_by_nip(&self, nip: &Nip) -> RepositoryResult<Option<Company>> {
        let row: Option<CompanyRow> =
            sqlx::query_as(&format!("SELECT {} FROM companies WHERE nip = $1", COLUMNS))
                .bind(nip.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to find company by NIP", e))?;

        row.map(Company::try_from).transpose()
    }

    async fn list(&self, filter: &CompanyFilter, page: PageRequest) -> RepositoryResult<Page<Company>> {
        let (limit, offset) = limit_offset(page);
        let industry = filter.industry.map(|i| i.as_str());

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM companies {}", FILTER))
            .bind(industry)
            .bind(filter.size)
            .bind(filter.is_active)
            .bind(filter.search.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count companies", e))?;

        let rows: Vec<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {} FROM companies {} ORDER BY name, id LIMIT $5 OFFSET $6",
            COLUMNS, FILTER
        ))
        .bind(industry)
        .bind(filter.size)
        .bind(filter.is_active)
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list companies", e))?;

        let companies = rows
            .into_iter()
            .map(Company::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::from_parts(companies, total(count), page))
    }

    async fn deactivate(&self, id: Uuid) -> RepositoryResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("Failed to begin transaction", e))?;

        let company = sqlx::query("UPDATE companies SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("Failed to deactivate company", e))?;
        if company.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Company", id));
        }

        let users = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE company_id = $1 AND is_active",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("Failed to deactivate company users", e))?;

        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit deactivation", e))?;

        Ok(users.rows_affected())
    }
}

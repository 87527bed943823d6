use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{database_error, limit_offset, total};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::{RepositoryError, RepositoryResult, UserFilter, UserRepository};
use crate::domain::user::{Email, User, UserRole};

const COLUMNS: &str = r#"
    id, email, first_name, last_name, role, company_id, is_active,
    password_hash, last_login_at, created_at, updated_at
"#;

const FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR company_id = $1)
      AND ($2::user_role IS NULL OR role = $2)
      AND ($3::boolean IS NULL OR is_active = $3)
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: UserRole,
    company_id: Uuid,
    is_active: bool,
    password_hash: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(r.email).map_err(|reason| RepositoryError::Corrupt {
            entity: "user",
            reason,
        })?;
        Ok(User::from_persistence(
            r.id,
            email,
            r.first_name,
            r.last_name,
            r.role,
            r.company_id,
            r.is_active,
            r.password_hash,
            r.last_login_at,
            r.created_at,
            r.updated_at,
        ))
    }
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, role, company_id, is_active,
                password_hash, last_login_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                role = EXCLUDED.role,
                is_active = EXCLUDED.is_active,
                password_hash = EXCLUDED.password_hash,
                last_login_at = EXCLUDED.last_login_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id())
        .bind(user.email().as_str())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.role())
        .bind(user.company_id())
        .bind(user.is_active())
        .bind(user.password_hash())
        .bind(user.last_login_at())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save user", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to find user by id", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", COLUMNS))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to find user by email", e))?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> RepositoryResult<Page<User>> {
        let (limit, offset) = limit_offset(page);

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {}", FILTER))
            .bind(filter.company_id)
            .bind(filter.role)
            .bind(filter.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count users", e))?;

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users {} ORDER BY last_name, first_name, id LIMIT $4 OFFSET $5",
            COLUMNS, FILTER
        ))
        .bind(filter.company_id)
        .bind(filter.role)
        .bind(filter.is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list users", e))?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::from_parts(users, total(count), page))
    }
}

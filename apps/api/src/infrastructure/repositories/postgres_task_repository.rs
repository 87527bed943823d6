use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{database_error, limit_offset, total};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::{RepositoryError, RepositoryResult, TaskFilter, TaskRepository};
use crate::domain::task::{Task, TaskPriority, TaskStatus};

const COLUMNS: &str = r#"
    id, company_id, title, description, priority, status,
    due_date, completed_at, assigned_to_id, created_at, updated_at
"#;

const FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR company_id = $1)
      AND ($2::uuid IS NULL OR assigned_to_id = $2)
      AND ($3::task_status IS NULL OR status = $3)
      AND ($4::task_priority IS NULL OR priority = $4)
"#;

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    company_id: Uuid,
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    status: TaskStatus,
    due_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    assigned_to_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        Task::from_persistence(
            r.id,
            r.company_id,
            r.title,
            r.description,
            r.priority,
            r.status,
            r.due_date,
            r.completed_at,
            r.assigned_to_id,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL implementation of TaskRepository
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn save(&self, task: &Task) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, company_id, title, description, priority, status,
                due_date, completed_at, assigned_to_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                priority = EXCLUDED.priority,
                status = EXCLUDED.status,
                due_date = EXCLUDED.due_date,
                completed_at = EXCLUDED.completed_at,
                assigned_to_id = EXCLUDED.assigned_to_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(task.id())
        .bind(task.company_id())
        .bind(task.title())
        .bind(task.description())
        .bind(task.priority())
        .bind(task.status())
        .bind(task.due_date())
        .bind(task.completed_at())
        .bind(task.assigned_to_id())
        .bind(task.created_at())
        .bind(task.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save task", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("SELECT {} FROM tasks WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to find task by id", e))?;

        Ok(row.map(Task::from))
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> RepositoryResult<Page<Task>> {
        let (limit, offset) = limit_offset(page);

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tasks {}", FILTER))
            .bind(filter.company_id)
            .bind(filter.assigned_to_id)
            .bind(filter.status)
            .bind(filter.priority)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to count tasks", e))?;

        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tasks {} ORDER BY due_date ASC NULLS LAST, created_at, id LIMIT $5 OFFSET $6",
            COLUMNS, FILTER
        ))
        .bind(filter.company_id)
        .bind(filter.assigned_to_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list tasks", e))?;

        Ok(Page::from_parts(
            rows.into_iter().map(Task::from).collect(),
            total(count),
            page,
        ))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete task", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Task", id));
        }
        Ok(())
    }
}

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::JwtAuth;
use crate::api::response::{created, list, ok, ApiResponse, ListResponse};
use crate::domain::pagination::PageQuery;
use crate::domain::repositories::TaskFilter;
use crate::domain::task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
use crate::domain::validation::{as_object, ValidationError, ValidationErrors};
use crate::state::AppState;

use super::{active_company, page_request, parse_filter};

/// Query parameters for listing tasks
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub company_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

async fn find_task(state: &AppState, id: Uuid) -> Result<Task, ApiError> {
    state
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Task {} not found", id)))
}

/// The assignee must be an existing user of the task's company
async fn check_assignee(state: &AppState, company_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", user_id)))?;

    if user.company_id() != company_id {
        return Err(ValidationErrors::single(ValidationError::cross_field(
            &["assignedToId", "companyId"],
            "assignee must belong to the task's company",
        ))
        .into());
    }
    Ok(())
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<ListResponse<Task>>, ApiError> {
    let filter = TaskFilter {
        company_id: query.company_id,
        assigned_to_id: query.assigned_to_id,
        status: parse_filter::<TaskStatus>("status", query.status.as_deref())?,
        priority: parse_filter::<TaskPriority>("priority", query.priority.as_deref())?,
    };
    let page = state
        .tasks
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Tasks retrieved"))
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>), ApiError> {
    let new_task = NewTask::from_payload(as_object(&body)?)?;
    active_company(&state, new_task.company_id).await?;
    check_assignee(&state, new_task.company_id, new_task.assigned_to_id).await?;

    let task = Task::new(new_task);
    state.tasks.save(&task).await?;

    tracing::info!(
        task_id = %task.id(),
        assigned_to = %task.assigned_to_id(),
        created_by = %claims.sub,
        "Task created"
    );
    Ok(created(task, "Task created successfully"))
}

/// GET /api/v1/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = find_task(&state, id).await?;
    Ok(ok(task, "Task retrieved"))
}

/// PUT /api/v1/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let changes = TaskChanges::from_payload(as_object(&body)?)?;
    let mut task = find_task(&state, id).await?;
    if let Some(assignee) = changes.assigned_to_id {
        check_assignee(&state, task.company_id(), assignee).await?;
    }

    task.apply(changes)?;
    state.tasks.save(&task).await?;

    tracing::info!(task_id = %id, status = %task.status(), "Task updated");
    Ok(ok(task, "Task updated successfully"))
}

/// DELETE /api/v1/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.tasks.delete(id).await?;

    tracing::info!(task_id = %id, by = %claims.sub, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/tasks/assignee/:userId
pub async fn list_assignee_tasks(
    State(state): State<AppState>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ListResponse<Task>>, ApiError> {
    let filter = TaskFilter {
        assigned_to_id: Some(user_id),
        ..TaskFilter::default()
    };
    let page = state
        .tasks
        .list(&filter, page_request(query.page, query.limit)?)
        .await?;

    Ok(list(page, "Tasks retrieved"))
}

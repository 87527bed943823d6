use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::task::{Task, TaskPriority, TaskStatus};

/// Optional criteria for listing tasks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub company_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.company_id.map_or(true, |id| task.company_id() == id)
            && self.assigned_to_id.map_or(true, |id| task.assigned_to_id() == id)
            && self.status.map_or(true, |s| task.status() == s)
            && self.priority.map_or(true, |p| task.priority() == p)
    }
}

/// Repository trait for tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Save a task (insert or update)
    async fn save(&self, task: &Task) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>>;

    /// List tasks, earliest due date first
    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> RepositoryResult<Page<Task>>;

    /// Delete a task, failing with `NotFound` if it does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::value_objects::{TaskPriority, TaskStatus};
use crate::domain::catalog::limits;
use crate::domain::errors::TransitionError;
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::{ValidationError, ValidationErrors};

fn check_completion(
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (status, completed_at) {
        (TaskStatus::Completed, None) => Err(ValidationError::cross_field(
            &["status", "completedAt"],
            "completedAt is required when status is COMPLETED",
        )),
        (status, Some(_)) if status != TaskStatus::Completed => Err(ValidationError::cross_field(
            &["status", "completedAt"],
            "completedAt is only allowed when status is COMPLETED",
        )),
        _ => Ok(()),
    }
}

/// A validated payload for creating a task
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to_id: Uuid,
}

impl NewTask {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let company_id = r.uuid("companyId", Presence::Required);
        let title = r.string("title", Presence::Required, limits::TITLE_MAX_LENGTH);
        let description = r.string("description", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH);
        let priority = r.enumerated::<TaskPriority>("priority", Presence::Optional);
        let status = r.enumerated::<TaskStatus>("status", Presence::Optional);
        let due_date = r.end_datetime("dueDate", Presence::Optional);
        let completed_at = r.datetime("completedAt", Presence::Optional);
        let assigned_to_id = r.uuid("assignedToId", Presence::Required);

        // An unparseable status has already been reported
        if status.is_some() || !r.is_present("status") {
            if let Err(e) = check_completion(status.unwrap_or(TaskStatus::Todo), completed_at) {
                r.push(e);
            }
        }
        r.finish()?;

        Ok(Self {
            company_id: present(company_id, "companyId")?,
            title: present(title, "title")?,
            description,
            priority: priority.unwrap_or_default(),
            status: status.unwrap_or(TaskStatus::Todo),
            due_date,
            completed_at,
            assigned_to_id: present(assigned_to_id, "assignedToId")?,
        })
    }
}

/// A validated partial update for a task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to_id: Option<Uuid>,
}

impl TaskChanges {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Update);
        let changes = Self {
            title: r.string("title", Presence::Optional, limits::TITLE_MAX_LENGTH),
            description: r.string("description", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH),
            priority: r.enumerated::<TaskPriority>("priority", Presence::Optional),
            status: r.enumerated::<TaskStatus>("status", Presence::Optional),
            due_date: r.end_datetime("dueDate", Presence::Optional),
            completed_at: r.datetime("completedAt", Presence::Optional),
            assigned_to_id: r.uuid("assignedToId", Presence::Optional),
        };
        if let (Some(status), Some(_)) = (changes.status, changes.completed_at) {
            if status != TaskStatus::Completed {
                r.push(ValidationError::cross_field(
                    &["status", "completedAt"],
                    "completedAt is only allowed when status is COMPLETED",
                ));
            }
        }
        r.finish()?;
        Ok(changes)
    }
}

/// Why a task update was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskUpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Task aggregate
///
/// # Invariants
/// - `completed_at` is set if and only if the status is COMPLETED
/// - Status follows TODO -> IN_PROGRESS -> REVIEW -> COMPLETED, with
///   REVIEW -> IN_PROGRESS for rework and CANCELLED from any open state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
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

impl Task {
    pub fn new(new_task: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: new_task.company_id,
            title: new_task.title,
            description: new_task.description,
            priority: new_task.priority,
            status: new_task.status,
            due_date: new_task.due_date,
            completed_at: new_task.completed_at,
            assigned_to_id: new_task.assigned_to_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the task to `next`, stamping `completed_at` when it completes
    pub fn transition_to(
        &mut self,
        next: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::new("task", self.status, next));
        }
        self.status = next;
        self.completed_at = match next {
            TaskStatus::Completed => Some(completed_at.unwrap_or_else(Utc::now)),
            _ => None,
        };
        self.touch();
        Ok(())
    }

    /// Applies a validated partial update
    ///
    /// Nothing is changed if the update is refused.
    pub fn apply(&mut self, changes: TaskChanges) -> Result<(), TaskUpdateError> {
        match changes.status {
            Some(next) if next != self.status => {
                self.transition_to(next, changes.completed_at)?;
            }
            _ => {
                if let Some(completed_at) = changes.completed_at {
                    check_completion(self.status, Some(completed_at)).map_err(ValidationErrors::from)?;
                    self.completed_at = Some(completed_at);
                }
            }
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if changes.due_date.is_some() {
            self.due_date = changes.due_date;
        }
        if let Some(assigned_to_id) = changes.assigned_to_id {
            self.assigned_to_id = assigned_to_id;
        }
        self.touch();
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn assigned_to_id(&self) -> Uuid {
        self.assigned_to_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Task from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
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
    ) -> Self {
        Self {
            id,
            company_id,
            title,
            description,
            priority,
            status,
            due_date,
            completed_at,
            assigned_to_id,
            created_at,
            updated_at,
        }
    }
}

// Shared application state handed to every handler

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::domain::reporting::SelectionPolicy;
use crate::domain::repositories::{
    CompanyRepository, EsgMetricRepository, ReportRepository, SurveyRepository, TaskRepository,
    UserRepository,
};
use crate::infrastructure::repositories::{
    InMemoryStore, PostgresCompanyRepository, PostgresEsgMetricRepository,
    PostgresReportRepository, PostgresSurveyRepository, PostgresTaskRepository,
    PostgresUserRepository,
};

/// Repository handles plus configuration
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub companies: Arc<dyn CompanyRepository>,
    pub users: Arc<dyn UserRepository>,
    pub metrics: Arc<dyn EsgMetricRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub surveys: Arc<dyn SurveyRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub selection_policy: Arc<SelectionPolicy>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            companies: Arc::new(PostgresCompanyRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            metrics: Arc::new(PostgresEsgMetricRepository::new(pool.clone())),
            reports: Arc::new(PostgresReportRepository::new(pool.clone())),
            surveys: Arc::new(PostgresSurveyRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool)),
            selection_policy: Arc::new(SelectionPolicy::default()),
        }
    }

    /// State backed by a single in-memory store
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            config: Arc::new(config),
            companies: store.clone(),
            users: store.clone(),
            metrics: store.clone(),
            reports: store.clone(),
            surveys: store.clone(),
            tasks: store,
            selection_policy: Arc::new(SelectionPolicy::default()),
        }
    }

    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection_policy = Arc::new(policy);
        self
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::company::{Company, Nip};
use crate::domain::esg_metric::EsgMetric;
use crate::domain::pagination::{paginate_with, Page, PageRequest};
use crate::domain::report::Report;
use crate::domain::repositories::{
    CompanyFilter, CompanyRepository, EsgMetricFilter, EsgMetricRepository, ReportFilter,
    ReportRepository, RepositoryError, RepositoryResult, SurveyFilter, SurveyRepository,
    TaskFilter, TaskRepository, UserFilter, UserRepository,
};
use crate::domain::survey::{Survey, SurveyResponse};
use crate::domain::task::Task;
use crate::domain::user::{Email, User};

#[derive(Default)]
struct Tables {
    companies: HashMap<Uuid, Company>,
    users: HashMap<Uuid, User>,
    metrics: HashMap<Uuid, EsgMetric>,
    reports: HashMap<Uuid, Report>,
    surveys: HashMap<Uuid, Survey>,
    responses: Vec<SurveyResponse>,
    tasks: HashMap<Uuid, Task>,
}

/// Process-local storage implementing every repository trait
///
/// Used by tests and local runs without a database. The same uniqueness
/// rules as the PostgreSQL schema apply (email and NIP).
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn select<T: Clone>(
    rows: &HashMap<Uuid, T>,
    keep: impl Fn(&T) -> bool,
    order: impl FnMut(&T, &T) -> std::cmp::Ordering,
    page: PageRequest,
) -> Page<T> {
    let mut items: Vec<T> = rows.values().filter(|&row| keep(row)).cloned().collect();
    items.sort_by(order);
    paginate_with(items, page)
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn save(&self, company: &Company) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .companies
            .values()
            .any(|c| c.id() != company.id() && c.nip() == company.nip());
        if taken {
            return Err(RepositoryError::Conflict(
                "A company with this NIP already exists".to_string(),
            ));
        }
        tables.companies.insert(company.id(), company.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn find_by_nip(&self, nip: &Nip) -> RepositoryResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables.companies.values().find(|c| c.nip() == nip).cloned())
    }

    async fn list(&self, filter: &CompanyFilter, page: PageRequest) -> RepositoryResult<Page<Company>> {
        let tables = self.tables.read().await;
        Ok(select(
            &tables.companies,
            |c| filter.matches(c),
            |a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())),
            page,
        ))
    }

    async fn deactivate(&self, id: Uuid) -> RepositoryResult<u64> {
        let mut tables = self.tables.write().await;
        let company = tables
            .companies
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Company", id))?;
        company.deactivate();

        let mut deactivated = 0;
        for user in tables.users.values_mut() {
            if user.company_id() == id && user.is_active() {
                user.deactivate();
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn save(&self, user: &User) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email());
        if taken {
            return Err(RepositoryError::Conflict("Email already registered".to_string()));
        }
        tables.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email() == email).cloned())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> RepositoryResult<Page<User>> {
        let tables = self.tables.read().await;
        Ok(select(
            &tables.users,
            |u| filter.matches(u),
            |a, b| {
                (a.last_name(), a.first_name(), a.id()).cmp(&(b.last_name(), b.first_name(), b.id()))
            },
            page,
        ))
    }
}

#[async_trait]
impl EsgMetricRepository for InMemoryStore {
    async fn save(&self, metric: &EsgMetric) -> RepositoryResult<()> {
        self.tables.write().await.metrics.insert(metric.id(), metric.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<EsgMetric>> {
        Ok(self.tables.read().await.metrics.get(&id).cloned())
    }

    async fn list(&self, filter: &EsgMetricFilter, page: PageRequest) -> RepositoryResult<Page<EsgMetric>> {
        let tables = self.tables.read().await;
        Ok(select(
            &tables.metrics,
            |m| filter.matches(m),
            |a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())),
            page,
        ))
    }

    async fn find_for_period(&self, company_id: Uuid, period: &str) -> RepositoryResult<Vec<EsgMetric>> {
        let tables = self.tables.read().await;
        let mut metrics: Vec<EsgMetric> = tables
            .metrics
            .values()
            .filter(|m| m.company_id() == company_id && m.period() == period)
            .cloned()
            .collect();
        metrics.sort_by(|a, b| (a.category(), a.name()).cmp(&(b.category(), b.name())));
        Ok(metrics)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.tables
            .write()
            .await
            .metrics
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("ESG metric", id))
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn save(&self, report: &Report) -> RepositoryResult<()> {
        self.tables.write().await.reports.insert(report.id(), report.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Report>> {
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn list(&self, filter: &ReportFilter, page: PageRequest) -> RepositoryResult<Page<Report>> {
        let tables = self.tables.read().await;
        Ok(select(
            &tables.reports,
            |r| filter.matches(r),
            |a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())),
            page,
        ))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.tables
            .write()
            .await
            .reports
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Report", id))
    }
}

#[async_trait]
impl SurveyRepository for InMemoryStore {
    async fn save(&self, survey: &Survey) -> RepositoryResult<()> {
        self.tables.write().await.surveys.insert(survey.id(), survey.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Survey>> {
        Ok(self.tables.read().await.surveys.get(&id).cloned())
    }

    async fn list(&self, filter: &SurveyFilter, page: PageRequest) -> RepositoryResult<Page<Survey>> {
        let tables = self.tables.read().await;
        Ok(select(
            &tables.surveys,
            |s| filter.matches(s),
            |a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())),
            page,
        ))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if tables.surveys.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Survey", id));
        }
        tables.responses.retain(|r| r.survey_id != id);
        Ok(())
    }

    async fn save_response(&self, response: &SurveyResponse) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.surveys.contains_key(&response.survey_id) {
            return Err(RepositoryError::not_found("Survey", response.survey_id));
        }
        tables.responses.push(response.clone());
        Ok(())
    }

    async fn list_responses(&self, survey_id: Uuid, page: PageRequest) -> RepositoryResult<Page<SurveyResponse>> {
        let tables = self.tables.read().await;
        let responses: Vec<SurveyResponse> = tables
            .responses
            .iter()
            .filter(|r| r.survey_id == survey_id)
            .cloned()
            .collect();
        Ok(paginate_with(responses, page))
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn save(&self, task: &Task) -> RepositoryResult<()> {
        self.tables.write().await.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> RepositoryResult<Page<Task>> {
        let tables = self.tables.read().await;
        Ok(select(
            &tables.tasks,
            |t| filter.matches(t),
            |a, b| match (a.due_date(), b.due_date()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(a.created_at().cmp(&b.created_at()))
            .then(a.id().cmp(&b.id())),
            page,
        ))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.tables
            .write()
            .await
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Task", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::NewCompany;
    use crate::domain::user::NewUser;
    use serde_json::json;

    fn company(nip: &str) -> Company {
        let payload = json!({
            "name": "Acme",
            "nip": nip,
            "industry": "Retail",
            "size": "MICRO",
            "street": "Prosta 1",
            "city": "Łódź",
            "postalCode": "90-001",
            "country": "Poland"
        });
        Company::new(NewCompany::from_payload(payload.as_object().unwrap()).unwrap())
    }

    fn user(company_id: Uuid, email: &str) -> User {
        let payload = json!({
            "email": email,
            "firstName": "Jan",
            "lastName": "Nowak",
            "companyId": company_id.to_string(),
            "password": "long-enough"
        });
        User::new(NewUser::from_payload(payload.as_object().unwrap()).unwrap(), "hash".into())
    }

    #[tokio::test]
    async fn duplicate_nip_is_conflict() {
        let store = InMemoryStore::new();
        CompanyRepository::save(&store, &company("5260250274")).await.unwrap();

        let result = CompanyRepository::save(&store, &company("526-025-02-74")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let store = InMemoryStore::new();
        let company_id = Uuid::new_v4();
        UserRepository::save(&store, &user(company_id, "a@example.com")).await.unwrap();

        let result = UserRepository::save(&store, &user(company_id, "A@example.com")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn deactivating_company_cascades_to_users() {
        let store = InMemoryStore::new();
        let acme = company("5260250274");
        CompanyRepository::save(&store, &acme).await.unwrap();
        UserRepository::save(&store, &user(acme.id(), "a@example.com")).await.unwrap();
        UserRepository::save(&store, &user(acme.id(), "b@example.com")).await.unwrap();
        UserRepository::save(&store, &user(Uuid::new_v4(), "c@example.com")).await.unwrap();

        let deactivated = store.deactivate(acme.id()).await.unwrap();
        assert_eq!(deactivated, 2);

        let stored = CompanyRepository::find_by_id(&store, acme.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());

        let active = UserFilter {
            is_active: Some(true),
            ..UserFilter::default()
        };
        let page = UserRepository::list(&store, &active, PageRequest::default()).await.unwrap();
        assert_eq!(page.meta.total, 1);
    }

    #[tokio::test]
    async fn deleting_missing_task_is_not_found() {
        let store = InMemoryStore::new();
        let result = TaskRepository::delete(&store, Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}

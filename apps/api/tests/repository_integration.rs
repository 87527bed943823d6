//! Integration tests for the PostgreSQL repositories
//!
//! These tests need a live database and are ignored by default. Run them with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::{Duration, Utc};
use esg_platform_api::domain::company::{Company, NewCompany};
use esg_platform_api::domain::esg_metric::{EsgMetric, NewEsgMetric};
use esg_platform_api::domain::pagination::PageRequest;
use esg_platform_api::domain::report::{NewReport, Report, ReportStatus, ReportType};
use esg_platform_api::domain::repositories::{
    CompanyRepository, EsgMetricRepository, ReportRepository, RepositoryError, SurveyRepository,
    TaskFilter, TaskRepository, UserFilter, UserRepository,
};
use esg_platform_api::domain::survey::{NewSurvey, Survey, SurveyStatus, SurveyType};
use esg_platform_api::domain::task::{NewTask, Task, TaskPriority, TaskStatus};
use esg_platform_api::domain::user::{Email, NewUser, User, UserRole};
use esg_platform_api::infrastructure::repositories::{
    PostgresCompanyRepository, PostgresEsgMetricRepository, PostgresReportRepository,
    PostgresSurveyRepository, PostgresTaskRepository, PostgresUserRepository,
};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Set up test database connection pool with the schema applied
async fn setup_test_db() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for integration tests");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A random NIP with a valid checksum, so parallel tests never collide
fn unique_nip() -> String {
    const WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];
    loop {
        let digits: Vec<u32> = Uuid::new_v4().as_bytes()[..9]
            .iter()
            .map(|b| u32::from(*b) % 10)
            .collect();
        let checksum = digits.iter().zip(WEIGHTS).map(|(d, w)| d * w).sum::<u32>() % 11;
        if checksum != 10 {
            return digits
                .iter()
                .chain(std::iter::once(&checksum))
                .map(|d| d.to_string())
                .collect();
        }
    }
}

/// Create a test company for isolation
async fn create_test_company(repo: &PostgresCompanyRepository) -> Company {
    let payload = json!({
        "name": "Test Company",
        "nip": unique_nip(),
        "industry": "Energy",
        "size": "LARGE",
        "street": "ul. Testowa 5",
        "city": "Gdańsk",
        "postalCode": "80-001",
        "country": "Poland"
    });
    let company = Company::new(NewCompany::from_payload(payload.as_object().unwrap()).unwrap());
    repo.save(&company).await.expect("Failed to create test company");
    company
}

fn test_user(company_id: Uuid, email: &str) -> User {
    User::new(
        NewUser {
            email: Email::new(email).unwrap(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: UserRole::Manager,
            company_id,
            password: String::new(),
        },
        "$2b$12$placeholderplaceholderplaceholderplaceholderplaceho".to_string(),
    )
}

fn test_metric(company_id: Uuid, period: &str, value: i64) -> EsgMetric {
    EsgMetric::new(NewEsgMetric {
        company_id,
        category: esg_platform_api::domain::esg_metric::EsgCategory::Environmental,
        metric_type: "scope1_emissions".to_string(),
        name: "Scope 1 emissions".to_string(),
        value: Decimal::new(value, 1),
        unit: "tCO2e".to_string(),
        period: period.to_string(),
        source: Some("Meter readings".to_string()),
        verified: false,
        notes: None,
    })
}

/// Clean up test data after each test
async fn cleanup_test_company(pool: &PgPool, company_id: Uuid) {
    for table in ["tasks", "surveys", "reports", "esg_metrics", "users"] {
        sqlx::query(&format!("DELETE FROM {} WHERE company_id = $1", table))
            .bind(company_id)
            .execute(pool)
            .await
            .expect("Failed to cleanup test data");
    }
    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(company_id)
        .execute(pool)
        .await
        .expect("Failed to cleanup test company");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_company_repository_find_by_nip_and_duplicate() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let company = create_test_company(&companies).await;

    let found = companies
        .find_by_nip(company.nip())
        .await
        .expect("Query failed")
        .expect("Company not found");
    assert_eq!(found.id(), company.id());
    assert_eq!(found.industry(), company.industry());

    // A second company with the same NIP violates the unique constraint
    let payload = json!({
        "name": "Copycat",
        "nip": company.nip().as_str(),
        "industry": "Energy",
        "size": "SMALL",
        "street": "ul. Inna 1",
        "city": "Gdynia",
        "postalCode": "81-001",
        "country": "Poland"
    });
    let duplicate = Company::new(NewCompany::from_payload(payload.as_object().unwrap()).unwrap());
    let result = companies.save(&duplicate).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    cleanup_test_company(&pool, company.id()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_company_deactivation_cascades_to_users() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let company = create_test_company(&companies).await;

    for n in 0..2 {
        let user = test_user(company.id(), &format!("cascade-{}-{}@test.pl", n, Uuid::new_v4().simple()));
        users.save(&user).await.expect("Failed to save user");
    }

    let deactivated = companies.deactivate(company.id()).await.expect("Deactivation failed");
    assert_eq!(deactivated, 2);

    let reloaded = companies.find_by_id(company.id()).await.unwrap().unwrap();
    assert!(!reloaded.is_active());

    let filter = UserFilter {
        company_id: Some(company.id()),
        is_active: Some(true),
        ..UserFilter::default()
    };
    let page = users.list(&filter, PageRequest::default()).await.unwrap();
    assert_eq!(page.meta.total, 0);

    let missing = companies.deactivate(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));

    cleanup_test_company(&pool, company.id()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_repository_duplicate_email_fails() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let company = create_test_company(&companies).await;

    let email = format!("duplicate-{}@test.pl", Uuid::new_v4().simple());
    users.save(&test_user(company.id(), &email)).await.expect("First save failed");

    let result = users.save(&test_user(company.id(), &email)).await;
    match result {
        Err(RepositoryError::Conflict(message)) => assert_eq!(message, "Email already registered"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let found = users
        .find_by_email(&Email::new(email.as_str()).unwrap())
        .await
        .unwrap()
        .expect("User not found");
    assert_eq!(found.role(), UserRole::Manager);

    cleanup_test_company(&pool, company.id()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_metric_repository_period_lookup_and_delete() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let metrics = PostgresEsgMetricRepository::new(pool.clone());
    let company = create_test_company(&companies).await;

    let kept = test_metric(company.id(), "2024", 1205);
    metrics.save(&kept).await.unwrap();
    metrics.save(&test_metric(company.id(), "2023", 990)).await.unwrap();

    let in_period = metrics.find_for_period(company.id(), "2024").await.unwrap();
    assert_eq!(in_period.len(), 1);
    assert_eq!(in_period[0].value(), Decimal::new(1205, 1));
    assert!(!in_period[0].verified());

    metrics.delete(kept.id()).await.unwrap();
    assert!(metrics.find_by_id(kept.id()).await.unwrap().is_none());
    assert!(matches!(
        metrics.delete(kept.id()).await,
        Err(RepositoryError::NotFound { .. })
    ));

    cleanup_test_company(&pool, company.id()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_report_repository_persists_status_changes() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let reports = PostgresReportRepository::new(pool.clone());
    let company = create_test_company(&companies).await;
    let author = test_user(company.id(), &format!("author-{}@test.pl", Uuid::new_v4().simple()));
    users.save(&author).await.unwrap();

    let mut report = Report::new(
        NewReport {
            company_id: company.id(),
            title: "Annual sustainability report".to_string(),
            report_type: ReportType::Sustainability,
            framework: None,
            period: "2024".to_string(),
            content: None,
            file_url: None,
        },
        author.id(),
    );
    reports.save(&report).await.unwrap();

    report.transition_to(ReportStatus::Review).unwrap();
    reports.save(&report).await.unwrap();

    let reloaded = reports.find_by_id(report.id()).await.unwrap().unwrap();
    assert_eq!(reloaded.status(), ReportStatus::Review);
    assert_eq!(reloaded.created_by_id(), author.id());

    cleanup_test_company(&pool, company.id()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_survey_responses_are_removed_with_survey() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let surveys = PostgresSurveyRepository::new(pool.clone());
    let company = create_test_company(&companies).await;
    let respondent = test_user(company.id(), &format!("respondent-{}@test.pl", Uuid::new_v4().simple()));
    users.save(&respondent).await.unwrap();

    let mut survey = Survey::new(NewSurvey {
        company_id: company.id(),
        title: "Workplace safety".to_string(),
        description: None,
        survey_type: SurveyType::WorkplaceSafety,
        start_date: Some(Utc::now() - Duration::days(1)),
        end_date: Some(Utc::now() + Duration::days(7)),
        is_anonymous: false,
    });
    survey.transition_to(SurveyStatus::Active).unwrap();
    surveys.save(&survey).await.unwrap();

    let response = survey
        .accept_response(respondent.id(), json!({"incidents": 0}), Utc::now())
        .unwrap();
    surveys.save_response(&response).await.unwrap();

    let page = surveys
        .list_responses(survey.id(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].answers["incidents"], 0);

    surveys.delete(survey.id()).await.unwrap();
    let page = surveys
        .list_responses(survey.id(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);

    cleanup_test_company(&pool, company.id()).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_task_repository_filters_by_assignee_and_status() {
    let pool = setup_test_db().await;
    let companies = PostgresCompanyRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let tasks = PostgresTaskRepository::new(pool.clone());
    let company = create_test_company(&companies).await;
    let assignee = test_user(company.id(), &format!("assignee-{}@test.pl", Uuid::new_v4().simple()));
    users.save(&assignee).await.unwrap();

    let new_task = |title: &str, status: TaskStatus| NewTask {
        company_id: company.id(),
        title: title.to_string(),
        description: None,
        priority: TaskPriority::High,
        status,
        due_date: None,
        completed_at: (status == TaskStatus::Completed).then(Utc::now),
        assigned_to_id: assignee.id(),
    };
    tasks.save(&Task::new(new_task("Open", TaskStatus::Todo))).await.unwrap();
    tasks.save(&Task::new(new_task("Done", TaskStatus::Completed))).await.unwrap();

    let filter = TaskFilter {
        assigned_to_id: Some(assignee.id()),
        status: Some(TaskStatus::Completed),
        ..TaskFilter::default()
    };
    let page = tasks.list(&filter, PageRequest::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].title(), "Done");
    assert!(page.data[0].completed_at().is_some());

    cleanup_test_company(&pool, company.id()).await;
}

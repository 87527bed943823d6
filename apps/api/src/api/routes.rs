use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::api::handlers::{auth, companies, esg_metrics, health, reports, surveys, tasks, users};
use crate::config::AppConfig;
use crate::state::AppState;

/// Builds the application router with every route under `/api/v1`
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // Companies
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/companies/:id",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::delete_company),
        )
        // ESG metrics
        .route(
            "/esg-metrics",
            get(esg_metrics::list_metrics).post(esg_metrics::create_metric),
        )
        .route(
            "/esg-metrics/:id",
            get(esg_metrics::get_metric)
                .put(esg_metrics::update_metric)
                .delete(esg_metrics::delete_metric),
        )
        .route(
            "/esg-metrics/company/:company_id",
            get(esg_metrics::list_company_metrics),
        )
        .route(
            "/esg-metrics/company/:company_id/summary",
            get(esg_metrics::company_summary),
        )
        // Reports
        .route("/reports", get(reports::list_reports).post(reports::create_report))
        .route("/reports/generate", post(reports::generate))
        .route(
            "/reports/:id",
            get(reports::get_report)
                .put(reports::update_report)
                .delete(reports::delete_report),
        )
        .route("/reports/:id/export", get(reports::export_report))
        // Surveys
        .route("/surveys", get(surveys::list_surveys).post(surveys::create_survey))
        .route(
            "/surveys/:id",
            get(surveys::get_survey)
                .put(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route(
            "/surveys/:id/responses",
            get(surveys::list_responses).post(surveys::submit_response),
        )
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/:id",
            get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/tasks/assignee/:user_id", get(tasks::list_assignee_tasks));

    Router::new()
        .nest("/api/v1", api)
        // Middleware
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = if config.cors_origin == "*" {
        AllowOrigin::any()
    } else {
        match config.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(_) => {
                tracing::warn!(origin = %config.cors_origin, "CORS_ORIGIN is not a valid header value, allowing any origin");
                AllowOrigin::any()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, records};
use crate::state::AppState;
use common::models::{AttendanceRecord, Department, Employee, OnboardingStep};

/// Upper bound on a request, including simulated repository latency
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Record collections
    let record_routes = Router::new()
        .route(
            "/api/employees",
            get(records::list::<Employee>).post(records::create::<Employee>),
        )
        .route(
            "/api/employees/:id",
            get(records::get::<Employee>)
                .put(records::update::<Employee>)
                .delete(records::delete::<Employee>),
        )
        .route(
            "/api/departments",
            get(records::list::<Department>).post(records::create::<Department>),
        )
        .route(
            "/api/departments/:id",
            get(records::get::<Department>)
                .put(records::update::<Department>)
                .delete(records::delete::<Department>),
        )
        .route(
            "/api/attendance",
            get(records::list::<AttendanceRecord>).post(records::create::<AttendanceRecord>),
        )
        .route(
            "/api/attendance/:id",
            get(records::get::<AttendanceRecord>)
                .put(records::update::<AttendanceRecord>)
                .delete(records::delete::<AttendanceRecord>),
        )
        .route(
            "/api/onboarding-steps",
            get(records::list::<OnboardingStep>).post(records::create::<OnboardingStep>),
        )
        .route(
            "/api/onboarding-steps/:id",
            get(records::get::<OnboardingStep>)
                .put(records::update::<OnboardingStep>)
                .delete(records::delete::<OnboardingStep>),
        );

    // Employee search and per-employee onboarding
    let employee_routes = Router::new()
        .route(
            "/api/employees/search",
            get(handlers::employees::search_employees),
        )
        .route(
            "/api/employees/:id/onboarding",
            get(handlers::employees::get_onboarding),
        )
        .route(
            "/api/employees/:id/onboarding/steps/:step_id",
            put(handlers::employees::record_step),
        )
        .route(
            "/api/employees/:id/onboarding/progress",
            get(handlers::employees::get_progress),
        );

    // Checklist status, documents and attendance marking
    let workflow_routes = Router::new()
        .route(
            "/api/onboarding-steps/:id/status",
            put(handlers::onboarding::update_step_status),
        )
        .route(
            "/api/onboarding-steps/:id/documents",
            post(handlers::onboarding::upload_document),
        )
        .route(
            "/api/attendance/mark",
            post(handlers::attendance::mark_attendance),
        );

    let report_routes = Router::new()
        .route("/api/reports/dashboard", get(handlers::reports::dashboard))
        .route(
            "/api/reports/attendance/today",
            get(handlers::reports::attendance_today),
        )
        .route(
            "/api/reports/attendance/week",
            get(handlers::reports::attendance_week),
        )
        .route(
            "/api/reports/departments",
            get(handlers::reports::departments),
        );

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(record_routes)
        .merge(employee_routes)
        .merge(workflow_routes)
        .merge(report_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
                .layer(cors)
                .layer(CatchPanicLayer::custom(handlers::panic_response)),
        )
        .with_state(state)
}

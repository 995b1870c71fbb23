use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::{Employee, OnboardingRecord, OnboardingStatus, RecordId};
use common::onboarding::EmployeeProgress;
use common::reports::EmployeeFilter;

/// Request to record an employee's status on one onboarding step
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStepRequest {
    pub status: OnboardingStatus,
    #[serde(default)]
    pub document_url: Option<String>,
}

/// Search employees by free text, department and status
#[tracing::instrument(skip(state))]
pub async fn search_employees(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> Result<SuccessResponse<Vec<Employee>>, ErrorResponse> {
    let employees = state.reports.search_employees(&filter).await?;
    tracing::debug!(matches = employees.len(), "Employee search completed");
    Ok(SuccessResponse::new(employees))
}

/// The employee's onboarding record, initialized on first access
#[tracing::instrument(skip(state))]
pub async fn get_onboarding(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<SuccessResponse<OnboardingRecord>, ErrorResponse> {
    let record = state.onboarding.employee_onboarding(id).await?;
    Ok(SuccessResponse::new(record))
}

#[tracing::instrument(skip(state, req))]
pub async fn record_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(RecordId, RecordId)>,
    Json(req): Json<RecordStepRequest>,
) -> Result<SuccessResponse<OnboardingRecord>, ErrorResponse> {
    let record = state
        .onboarding
        .record_step_status(id, step_id, req.status, req.document_url)
        .await?;
    Ok(SuccessResponse::new(record))
}

#[tracing::instrument(skip(state))]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<SuccessResponse<EmployeeProgress>, ErrorResponse> {
    let progress = state.onboarding.employee_progress(id).await?;
    Ok(SuccessResponse::new(progress))
}

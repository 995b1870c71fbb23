// Generic CRUD handlers shared by the four record collections

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::errors::ValidationError;
use common::models::{AttendanceRecord, Department, Employee, OnboardingStep, Record, RecordId};
use common::repository::Repository;
use common::validation::{
    validate_attendance, validate_department, validate_employee, validate_onboarding_step,
    ValidationMode,
};

/// A record type exposed as a collection on the HTTP surface
pub trait Resource: Record {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>>;

    fn validate(patch: &Self::Patch, mode: ValidationMode) -> Result<(), ValidationError>;
}

impl Resource for Employee {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repositories.employees.clone()
    }

    fn validate(patch: &Self::Patch, mode: ValidationMode) -> Result<(), ValidationError> {
        validate_employee(patch, mode)
    }
}

impl Resource for Department {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repositories.departments.clone()
    }

    fn validate(patch: &Self::Patch, mode: ValidationMode) -> Result<(), ValidationError> {
        validate_department(patch, mode)
    }
}

impl Resource for AttendanceRecord {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repositories.attendance.clone()
    }

    fn validate(patch: &Self::Patch, mode: ValidationMode) -> Result<(), ValidationError> {
        validate_attendance(patch, mode)
    }
}

impl Resource for OnboardingStep {
    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.repositories.onboarding_steps.clone()
    }

    fn validate(patch: &Self::Patch, mode: ValidationMode) -> Result<(), ValidationError> {
        validate_onboarding_step(patch, mode)
    }
}

#[tracing::instrument(skip(state), fields(entity = R::ENTITY))]
pub async fn list<R: Resource>(
    State(state): State<AppState>,
) -> Result<SuccessResponse<Vec<R>>, ErrorResponse> {
    let records = R::repository(&state).list().await?;
    Ok(SuccessResponse::new(records))
}

#[tracing::instrument(skip(state), fields(entity = R::ENTITY))]
pub async fn get<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<SuccessResponse<R>, ErrorResponse> {
    let record = R::repository(&state).get_by_id(id).await?;
    Ok(SuccessResponse::new(record))
}

#[tracing::instrument(skip(state, patch), fields(entity = R::ENTITY))]
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(patch): Json<R::Patch>,
) -> Result<SuccessResponse<R>, ErrorResponse> {
    R::validate(&patch, ValidationMode::Create)?;
    let record = R::repository(&state).create(patch).await?;
    tracing::info!(id = record.id(), "Record created via API");
    Ok(SuccessResponse::created(record))
}

#[tracing::instrument(skip(state, patch), fields(entity = R::ENTITY))]
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(patch): Json<R::Patch>,
) -> Result<SuccessResponse<R>, ErrorResponse> {
    R::validate(&patch, ValidationMode::Update)?;
    let record = R::repository(&state).update(id, patch).await?;
    Ok(SuccessResponse::new(record))
}

#[tracing::instrument(skip(state), fields(entity = R::ENTITY))]
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<SuccessResponse<R>, ErrorResponse> {
    let removed = R::repository(&state).delete(id).await?;
    tracing::info!(id, "Record deleted via API");
    Ok(SuccessResponse::new(removed))
}

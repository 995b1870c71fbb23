use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::{OnboardingStatus, OnboardingStep, RecordId};
use common::onboarding::{DocumentReceipt, DocumentUpload};

#[derive(Debug, Deserialize)]
pub struct StepStatusRequest {
    pub status: OnboardingStatus,
}

/// Document metadata offered for a step, optionally on behalf of an employee
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentRequest {
    #[serde(flatten)]
    pub document: DocumentUpload,
    #[serde(default)]
    pub employee_id: Option<RecordId>,
}

/// Update the checklist step's own status
#[tracing::instrument(skip(state, req))]
pub async fn update_step_status(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(req): Json<StepStatusRequest>,
) -> Result<SuccessResponse<OnboardingStep>, ErrorResponse> {
    let step = state.onboarding.update_step_status(id, req.status).await?;
    Ok(SuccessResponse::new(step))
}

/// Accept a document for a step and return its reference URL
#[tracing::instrument(skip(state, req))]
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(req): Json<UploadDocumentRequest>,
) -> Result<SuccessResponse<DocumentReceipt>, ErrorResponse> {
    let receipt = state
        .onboarding
        .upload_document(id, &req.document, req.employee_id)
        .await?;
    tracing::info!(
        step_id = id,
        employee_id = req.employee_id,
        document_url = %receipt.document_url,
        "Document uploaded"
    );
    Ok(SuccessResponse::created(receipt))
}

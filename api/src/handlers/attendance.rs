use axum::{extract::State, Json};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::attendance::{MarkAttendance, MarkOutcome};

/// Mark an employee's attendance for a day, creating or updating the record
#[tracing::instrument(skip(state, req))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Json(req): Json<MarkAttendance>,
) -> Result<SuccessResponse<MarkOutcome>, ErrorResponse> {
    let outcome = state.attendance.mark(req).await?;
    if outcome.created {
        Ok(SuccessResponse::created(outcome))
    } else {
        Ok(SuccessResponse::new(outcome))
    }
}

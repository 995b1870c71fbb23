use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::reports::{AttendanceSummary, Dashboard, DaySummary, DepartmentOverview};

/// `?date=YYYY-MM-DD`, defaulting to today
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[tracing::instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<SuccessResponse<Dashboard>, ErrorResponse> {
    Ok(SuccessResponse::new(state.reports.dashboard(query.date).await?))
}

#[tracing::instrument(skip(state))]
pub async fn attendance_today(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<SuccessResponse<AttendanceSummary>, ErrorResponse> {
    Ok(SuccessResponse::new(
        state.reports.today_attendance(query.date).await?,
    ))
}

#[tracing::instrument(skip(state))]
pub async fn attendance_week(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<SuccessResponse<Vec<DaySummary>>, ErrorResponse> {
    Ok(SuccessResponse::new(
        state.reports.weekly_attendance(query.date).await?,
    ))
}

#[tracing::instrument(skip(state))]
pub async fn departments(
    State(state): State<AppState>,
) -> Result<SuccessResponse<DepartmentOverview>, ErrorResponse> {
    Ok(SuccessResponse::new(state.reports.department_overview().await?))
}

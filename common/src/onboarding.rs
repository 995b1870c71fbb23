// Onboarding: progress aggregation, document intake and per-employee step completion

use crate::clock::Clock;
use crate::errors::{RepositoryError, ValidationError};
use crate::models::{
    Employee, EmployeePatch, OnboardingRecord, OnboardingStatus, OnboardingStep,
    OnboardingStepPatch, RecordId, StepCompletion,
};
use crate::repository::Repository;
use crate::telemetry::record_document_upload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 5 MiB
pub const MAX_DOCUMENT_BYTES: u64 = 5 * 1024 * 1024;

/// PDF, DOC, DOCX, JPEG and PNG
pub const ALLOWED_DOCUMENT_TYPES: [&str; 5] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
];

// ============================================================================
// Progress aggregation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_steps: usize,
    pub completed_steps: usize,
    /// round(completed / total * 100), 0 when there are no steps
    pub percent: u32,
    pub status: OnboardingStatus,
}

pub fn progress(completed: usize, total: usize) -> Progress {
    let percent = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };

    let status = if total > 0 && completed == total {
        OnboardingStatus::Completed
    } else if completed > 0 && completed < total {
        OnboardingStatus::InProgress
    } else {
        OnboardingStatus::Pending
    };

    Progress {
        total_steps: total,
        completed_steps: completed,
        percent,
        status,
    }
}

/// A checklist step as seen by one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepProgress {
    pub step: OnboardingStep,
    pub status: OnboardingStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProgress {
    pub employee_id: RecordId,
    #[serde(flatten)]
    pub summary: Progress,
    pub steps: Vec<StepProgress>,
}

/// A step is complete for an employee iff their completion list holds a
/// `completed` entry for it
pub fn is_step_complete(record: Option<&OnboardingRecord>, step_id: RecordId) -> bool {
    record
        .and_then(|r| r.completion_for(step_id))
        .is_some_and(|c| c.status == OnboardingStatus::Completed)
}

/// Per-employee progress over the checklist. Completion entries for steps
/// that are not in `steps` are ignored. Neither input is modified.
pub fn employee_progress(
    employee_id: RecordId,
    steps: &[OnboardingStep],
    record: Option<&OnboardingRecord>,
) -> EmployeeProgress {
    let step_views: Vec<StepProgress> = steps
        .iter()
        .map(|step| {
            let completion = record.and_then(|r| r.completion_for(step.id));
            StepProgress {
                step: step.clone(),
                status: completion
                    .map(|c| c.status)
                    .unwrap_or(OnboardingStatus::Pending),
                completed_at: completion.map(|c| c.completed_at),
                document_url: completion.and_then(|c| c.document_url.clone()),
            }
        })
        .collect();

    let completed = steps
        .iter()
        .filter(|step| is_step_complete(record, step.id))
        .count();

    EmployeeProgress {
        employee_id,
        summary: progress(completed, steps.len()),
        steps: step_views,
    }
}

// ============================================================================
// Document intake
// ============================================================================

/// Metadata of a file offered for an onboarding step; no content is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReceipt {
    pub document_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Check content type first, then size (inclusive limit)
pub fn validate_document(upload: &DocumentUpload, max_bytes: u64) -> Result<(), ValidationError> {
    if !ALLOWED_DOCUMENT_TYPES.contains(&upload.content_type.as_str()) {
        return Err(ValidationError::InvalidDocumentType {
            content_type: upload.content_type.clone(),
        });
    }
    if upload.size > max_bytes {
        return Err(ValidationError::DocumentTooLarge {
            size: upload.size,
            limit: max_bytes,
        });
    }
    Ok(())
}

/// Accepts document metadata and hands back a generated reference
pub struct DocumentIntake {
    base_url: String,
    max_bytes: u64,
    clock: Arc<dyn Clock>,
}

impl DocumentIntake {
    pub fn new(base_url: impl Into<String>, max_bytes: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
            clock,
        }
    }

    /// Apply the document rules, counting rejections
    pub fn check(&self, step_id: RecordId, upload: &DocumentUpload) -> Result<(), ValidationError> {
        validate_document(upload, self.max_bytes).inspect_err(|e| {
            warn!(error = %e, step_id, "Document rejected");
            record_document_upload("rejected");
        })
    }

    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.size))]
    pub fn accept(
        &self,
        step_id: RecordId,
        upload: &DocumentUpload,
    ) -> Result<DocumentReceipt, ValidationError> {
        self.check(step_id, upload)?;
        Ok(self.issue(step_id, upload))
    }

    /// Mint the reference for an already checked document
    fn issue(&self, step_id: RecordId, upload: &DocumentUpload) -> DocumentReceipt {
        let uploaded_at = self.clock.now();
        let document_url = format!(
            "{}/{}-{}-{}",
            self.base_url,
            step_id,
            uploaded_at.timestamp_millis(),
            upload.file_name
        );

        record_document_upload("accepted");
        info!(step_id, document_url = %document_url, "Document accepted");
        DocumentReceipt {
            document_url,
            file_name: upload.file_name.clone(),
            file_size: upload.size,
            uploaded_at,
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Onboarding operations composed over the employee and step repositories.
///
/// Completion is tracked per employee on `Employee.onboarding`; the step's
/// own `status` is checklist metadata and does not count towards progress.
pub struct OnboardingService {
    employees: Arc<dyn Repository<Employee>>,
    steps: Arc<dyn Repository<OnboardingStep>>,
    documents: DocumentIntake,
    clock: Arc<dyn Clock>,
}

impl OnboardingService {
    pub fn new(
        employees: Arc<dyn Repository<Employee>>,
        steps: Arc<dyn Repository<OnboardingStep>>,
        documents: DocumentIntake,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            employees,
            steps,
            documents,
            clock,
        }
    }

    pub async fn steps(&self) -> Result<Vec<OnboardingStep>, RepositoryError> {
        self.steps.list().await
    }

    /// The employee's onboarding record, created (pending, empty) on first access
    #[instrument(skip(self))]
    pub async fn employee_onboarding(
        &self,
        employee_id: RecordId,
    ) -> Result<OnboardingRecord, RepositoryError> {
        let employee = self.employees.get_by_id(employee_id).await?;
        match employee.onboarding {
            Some(record) => Ok(record),
            None => {
                let record = OnboardingRecord::started_at(self.clock.now());
                self.store_record(employee_id, record.clone()).await?;
                info!(employee_id, "Onboarding record initialized");
                Ok(record)
            }
        }
    }

    /// Upsert the employee's completion entry for a step and recompute the
    /// overall onboarding status against the current checklist
    #[instrument(skip(self, document_url))]
    pub async fn record_step_status(
        &self,
        employee_id: RecordId,
        step_id: RecordId,
        status: OnboardingStatus,
        document_url: Option<String>,
    ) -> Result<OnboardingRecord, RepositoryError> {
        let employee = self.employees.get_by_id(employee_id).await?;
        let steps = self.steps.list().await?;
        let now = self.clock.now();

        let mut record = employee
            .onboarding
            .unwrap_or_else(|| OnboardingRecord::started_at(now));

        let entry = StepCompletion {
            step_id,
            status,
            completed_at: now,
            document_url,
        };
        match record
            .completed_steps
            .iter_mut()
            .find(|c| c.step_id == step_id)
        {
            Some(existing) => *existing = entry,
            None => record.completed_steps.push(entry),
        }

        let summary = employee_progress(employee_id, &steps, Some(&record)).summary;
        record.status = summary.status;
        record.completion_date = match summary.status {
            OnboardingStatus::Completed => record.completion_date.or(Some(now)),
            _ => None,
        };

        self.store_record(employee_id, record.clone()).await?;
        info!(
            employee_id,
            step_id,
            status = %status,
            overall = %record.status,
            "Onboarding step recorded"
        );
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn employee_progress(
        &self,
        employee_id: RecordId,
    ) -> Result<EmployeeProgress, RepositoryError> {
        let (employee, steps) = futures::try_join!(
            self.employees.get_by_id(employee_id),
            self.steps.list()
        )?;
        Ok(employee_progress(
            employee_id,
            &steps,
            employee.onboarding.as_ref(),
        ))
    }

    /// Update the checklist step's own status; `completedAt` is set for
    /// `completed` and cleared otherwise
    #[instrument(skip(self))]
    pub async fn update_step_status(
        &self,
        step_id: RecordId,
        status: OnboardingStatus,
    ) -> Result<OnboardingStep, RepositoryError> {
        let completed_at = match status {
            OnboardingStatus::Completed => Some(self.clock.now()),
            _ => None,
        };
        let patch = OnboardingStepPatch {
            status: Some(status),
            completed_at: Some(completed_at),
            ..Default::default()
        };
        let step = self.steps.update(step_id, patch).await?;
        info!(step_id, status = %status, "Onboarding step status updated");
        Ok(step)
    }

    /// Validate a document for a step and return its reference. When an
    /// employee is given, the step is also recorded as completed for them
    /// with the document URL attached.
    #[instrument(skip(self, upload))]
    pub async fn upload_document(
        &self,
        step_id: RecordId,
        upload: &DocumentUpload,
        employee_id: Option<RecordId>,
    ) -> Result<DocumentReceipt, RepositoryError> {
        self.documents.check(step_id, upload)?;
        self.steps.get_by_id(step_id).await?;
        let receipt = self.documents.issue(step_id, upload);

        if let Some(employee_id) = employee_id {
            self.record_step_status(
                employee_id,
                step_id,
                OnboardingStatus::Completed,
                Some(receipt.document_url.clone()),
            )
            .await?;
        }
        Ok(receipt)
    }

    async fn store_record(
        &self,
        employee_id: RecordId,
        record: OnboardingRecord,
    ) -> Result<Employee, RepositoryError> {
        self.employees
            .update(
                employee_id,
                EmployeePatch {
                    onboarding: Some(record),
                    ..Default::default()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, MockClock};
    use crate::models::Record;
    use crate::repository::{InMemoryRepository, Simulation};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap()
    }

    fn intake() -> DocumentIntake {
        DocumentIntake::new(
            "https://files.test/documents/",
            MAX_DOCUMENT_BYTES,
            Arc::new(FixedClock(at())),
        )
    }

    fn upload(content_type: &str, size: u64) -> DocumentUpload {
        DocumentUpload {
            file_name: "contract.pdf".to_string(),
            content_type: content_type.to_string(),
            size,
        }
    }

    fn step(id: RecordId) -> OnboardingStep {
        OnboardingStep::from_patch(
            id,
            OnboardingStepPatch {
                title: Some(format!("Step {}", id)),
                ..Default::default()
            },
        )
    }

    fn completion(step_id: RecordId, status: OnboardingStatus) -> StepCompletion {
        StepCompletion {
            step_id,
            status,
            completed_at: at(),
            document_url: None,
        }
    }

    struct Fixture {
        employees: InMemoryRepository<Employee>,
        steps: InMemoryRepository<OnboardingStep>,
        service: OnboardingService,
    }

    async fn fixture(step_count: RecordId) -> Fixture {
        let simulation = Arc::new(Simulation::disabled());
        let employees = InMemoryRepository::<Employee>::new(simulation.clone());
        let steps = InMemoryRepository::with_records(
            (1..=step_count).map(step).collect(),
            simulation,
        )
        .unwrap();
        employees
            .create(EmployeePatch {
                first_name: Some("Ann".to_string()),
                last_name: Some("Lee".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let clock: Arc<dyn Clock> = Arc::new(FixedClock(at()));
        let service = OnboardingService::new(
            Arc::new(employees.clone()),
            Arc::new(steps.clone()),
            DocumentIntake::new("https://files.test/documents", MAX_DOCUMENT_BYTES, clock.clone()),
            clock,
        );
        Fixture {
            employees,
            steps,
            service,
        }
    }

    #[test]
    fn test_progress_with_no_steps_is_pending() {
        let p = progress(0, 0);
        assert_eq!(p.percent, 0);
        assert_eq!(p.status, OnboardingStatus::Pending);
    }

    #[test]
    fn test_progress_all_done_is_completed() {
        let p = progress(3, 3);
        assert_eq!(p.percent, 100);
        assert_eq!(p.status, OnboardingStatus::Completed);
    }

    #[test]
    fn test_progress_partial_is_in_progress() {
        let p = progress(1, 4);
        assert_eq!(p.percent, 25);
        assert_eq!(p.status, OnboardingStatus::InProgress);

        assert_eq!(progress(2, 3).percent, 67);
        assert_eq!(progress(0, 5).status, OnboardingStatus::Pending);
    }

    #[test]
    fn test_employee_progress_ignores_unknown_and_unfinished_steps() {
        let steps: Vec<_> = (1..=4).map(step).collect();
        let mut record = OnboardingRecord::started_at(at());
        record.completed_steps = vec![
            completion(1, OnboardingStatus::Completed),
            completion(2, OnboardingStatus::InProgress),
            completion(99, OnboardingStatus::Completed),
        ];

        let result = employee_progress(7, &steps, Some(&record));
        assert_eq!(result.employee_id, 7);
        assert_eq!(result.summary.completed_steps, 1);
        assert_eq!(result.summary.total_steps, 4);
        assert_eq!(result.summary.percent, 25);
        assert_eq!(result.steps[1].status, OnboardingStatus::InProgress);
        assert_eq!(result.steps[3].status, OnboardingStatus::Pending);
        assert_eq!(result.steps[3].completed_at, None);
    }

    #[test]
    fn test_employee_progress_without_record() {
        let steps: Vec<_> = (1..=2).map(step).collect();
        let result = employee_progress(1, &steps, None);
        assert_eq!(result.summary.status, OnboardingStatus::Pending);
        assert!(!is_step_complete(None, 1));
    }

    #[test]
    fn test_document_type_checked_before_size() {
        let err = validate_document(&upload("application/x-msdownload", 10 * 1024 * 1024), MAX_DOCUMENT_BYTES)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDocumentType { .. }));
    }

    #[test]
    fn test_document_size_limit_is_inclusive() {
        assert!(validate_document(&upload("image/png", MAX_DOCUMENT_BYTES), MAX_DOCUMENT_BYTES).is_ok());
        let err = validate_document(&upload("image/png", 6 * 1024 * 1024), MAX_DOCUMENT_BYTES)
            .unwrap_err();
        assert!(err.to_string().contains("5MB limit"));
    }

    #[test]
    fn test_accepted_document_gets_stamped_url() {
        let receipt = intake()
            .accept(3, &upload("application/pdf", 1024 * 1024))
            .unwrap();
        assert_eq!(
            receipt.document_url,
            format!(
                "https://files.test/documents/3-{}-contract.pdf",
                at().timestamp_millis()
            )
        );
        assert_eq!(receipt.file_size, 1024 * 1024);
        assert_eq!(receipt.uploaded_at, at());
    }

    #[tokio::test]
    async fn test_employee_onboarding_is_created_once() {
        let f = fixture(3).await;
        let record = f.service.employee_onboarding(1).await.unwrap();
        assert_eq!(record.status, OnboardingStatus::Pending);
        assert!(record.completed_steps.is_empty());

        let stored = f.employees.get_by_id(1).await.unwrap();
        assert_eq!(stored.onboarding, Some(record.clone()));
        assert_eq!(f.service.employee_onboarding(1).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_employee_onboarding_for_missing_employee() {
        let f = fixture(3).await;
        let err = f.service.employee_onboarding(9).await.unwrap_err();
        assert_eq!(err, RepositoryError::not_found("Employee", 9));
    }

    #[tokio::test]
    async fn test_recording_every_step_completes_onboarding() {
        let f = fixture(2).await;

        let record = f
            .service
            .record_step_status(1, 1, OnboardingStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(record.status, OnboardingStatus::InProgress);
        assert_eq!(record.completion_date, None);

        let record = f
            .service
            .record_step_status(1, 2, OnboardingStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(record.status, OnboardingStatus::Completed);
        assert_eq!(record.completion_date, Some(at()));

        let progress = f.service.employee_progress(1).await.unwrap();
        assert_eq!(progress.summary.percent, 100);

        // Reopening a step drops the completion date
        let record = f
            .service
            .record_step_status(1, 2, OnboardingStatus::InProgress, None)
            .await
            .unwrap();
        assert_eq!(record.status, OnboardingStatus::InProgress);
        assert_eq!(record.completion_date, None);
        assert_eq!(record.completed_steps.len(), 2);
    }

    #[tokio::test]
    async fn test_step_status_sets_and_clears_completed_at() {
        let f = fixture(1).await;

        let done = f
            .service
            .update_step_status(1, OnboardingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, Some(OnboardingStatus::Completed));
        assert_eq!(done.completed_at, Some(at()));

        let reopened = f
            .service
            .update_step_status(1, OnboardingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reopened.completed_at, None);
        assert_eq!(reopened.title.as_deref(), Some("Step 1"));
    }

    #[tokio::test]
    async fn test_step_status_for_unknown_step() {
        let f = fixture(1).await;
        let err = f
            .service
            .update_step_status(5, OnboardingStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::not_found("Onboarding step", 5));
    }

    #[tokio::test]
    async fn test_upload_rejects_before_looking_up_step() {
        let f = fixture(1).await;
        let err = f
            .service
            .upload_document(42, &upload("application/x-msdownload", 10), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Validation(ValidationError::InvalidDocumentType { .. })
        ));

        let err = f
            .service
            .upload_document(42, &upload("application/pdf", 10), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_upload_to_missing_step_issues_no_reference() {
        let mut intake_clock = MockClock::new();
        intake_clock.expect_now().never();
        let steps = InMemoryRepository::<OnboardingStep>::default();
        let service = OnboardingService::new(
            Arc::new(InMemoryRepository::<Employee>::default()),
            Arc::new(steps),
            DocumentIntake::new(
                "https://files.test/documents",
                MAX_DOCUMENT_BYTES,
                Arc::new(intake_clock),
            ),
            Arc::new(FixedClock(at())),
        );

        let err = service
            .upload_document(9, &upload("application/pdf", 10), None)
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::not_found("Onboarding step", 9));
    }

    #[tokio::test]
    async fn test_upload_for_employee_records_completion() {
        let f = fixture(2).await;
        let receipt = f
            .service
            .upload_document(2, &upload("application/pdf", 2048), Some(1))
            .await
            .unwrap();

        let record = f.service.employee_onboarding(1).await.unwrap();
        let entry = record.completion_for(2).unwrap();
        assert_eq!(entry.status, OnboardingStatus::Completed);
        assert_eq!(entry.document_url.as_deref(), Some(receipt.document_url.as_str()));
        assert_eq!(f.steps.len().await, 2);
    }
}

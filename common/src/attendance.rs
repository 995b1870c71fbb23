// Attendance marking: one record per employee and day

use crate::errors::RepositoryError;
use crate::models::{AttendancePatch, AttendanceRecord, AttendanceStatus, RecordId};
use crate::repository::Repository;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub employee_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkOutcome {
    pub record: AttendanceRecord,
    /// False when an existing record for the day was updated
    pub created: bool,
}

/// Default shift recorded for employees marked present
pub fn shift_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn shift_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default()
}

pub struct AttendanceService {
    attendance: Arc<dyn Repository<AttendanceRecord>>,
}

impl AttendanceService {
    pub fn new(attendance: Arc<dyn Repository<AttendanceRecord>>) -> Self {
        Self { attendance }
    }

    /// Upsert the record for (employee, date). Present sets the default
    /// shift times; other statuses leave any existing times in place.
    #[instrument(skip(self), fields(employee_id = mark.employee_id, date = %mark.date))]
    pub async fn mark(&self, mark: MarkAttendance) -> Result<MarkOutcome, RepositoryError> {
        let existing = self
            .attendance
            .list()
            .await?
            .into_iter()
            .find(|r| r.employee_id == Some(mark.employee_id) && r.date == Some(mark.date));

        let (check_in, check_out) = match mark.status {
            AttendanceStatus::Present => (Some(shift_start()), Some(shift_end())),
            _ => (None, None),
        };

        match existing {
            Some(record) => {
                let patch = AttendancePatch {
                    status: Some(mark.status),
                    check_in,
                    check_out,
                    ..Default::default()
                };
                let record = self.attendance.update(record.id, patch).await?;
                info!(id = record.id, status = %mark.status, "Attendance updated");
                Ok(MarkOutcome {
                    record,
                    created: false,
                })
            }
            None => {
                let patch = AttendancePatch {
                    employee_id: Some(mark.employee_id),
                    date: Some(mark.date),
                    status: Some(mark.status),
                    check_in,
                    check_out,
                    ..Default::default()
                };
                let record = self.attendance.create(patch).await?;
                info!(id = record.id, status = %mark.status, "Attendance marked");
                Ok(MarkOutcome {
                    record,
                    created: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn mark(employee_id: RecordId, status: AttendanceStatus) -> MarkAttendance {
        MarkAttendance {
            employee_id,
            date: day(),
            status,
        }
    }

    fn service() -> (AttendanceService, InMemoryRepository<AttendanceRecord>) {
        let repo = InMemoryRepository::<AttendanceRecord>::default();
        (AttendanceService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn test_present_creates_record_with_shift_times() {
        let (service, _) = service();
        let outcome = service.mark(mark(3, AttendanceStatus::Present)).await.unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.record.employee_id, Some(3));
        assert_eq!(outcome.record.check_in, Some(shift_start()));
        assert_eq!(outcome.record.check_out, Some(shift_end()));
    }

    #[tokio::test]
    async fn test_absent_creates_record_without_times() {
        let (service, _) = service();
        let outcome = service.mark(mark(3, AttendanceStatus::Absent)).await.unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.record.check_in, None);
        assert_eq!(outcome.record.check_out, None);
    }

    #[tokio::test]
    async fn test_remarking_updates_the_same_record() {
        let (service, repo) = service();
        let first = service.mark(mark(3, AttendanceStatus::Present)).await.unwrap();
        let second = service.mark(mark(3, AttendanceStatus::Late)).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.record.id, first.record.id);
        assert_eq!(second.record.status, Some(AttendanceStatus::Late));
        // Times from the earlier present mark are kept
        assert_eq!(second.record.check_in, Some(shift_start()));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_other_employee_or_day_gets_new_record() {
        let (service, repo) = service();
        service.mark(mark(3, AttendanceStatus::Present)).await.unwrap();
        service.mark(mark(4, AttendanceStatus::Present)).await.unwrap();
        service
            .mark(MarkAttendance {
                date: day().succ_opt().unwrap(),
                ..mark(3, AttendanceStatus::Present)
            })
            .await
            .unwrap();
        assert_eq!(repo.len().await, 3);
    }
}

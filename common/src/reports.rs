// Read-only aggregates over the repositories: attendance summaries, the
// dashboard, department overview and employee search

use crate::clock::{today, Clock};
use crate::errors::{RepositoryError, ValidationError};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Department, Employee, EmployeeStatus, RecordId,
};
use crate::repository::Repositories;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

const TOP_DEPARTMENTS: usize = 5;
const RECENT_ATTENDANCE: usize = 10;
const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub date: NaiveDate,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub half_day: usize,
    /// Active employees
    pub total: usize,
    pub marked: usize,
    pub unmarked: usize,
    pub attendance_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub present: usize,
    pub total: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentHeadcount {
    pub department: Department,
    pub employee_count: usize,
    pub active_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAttendance {
    pub record: AttendanceRecord,
    /// None when the record references a missing employee
    pub employee: Option<Employee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub date: NaiveDate,
    pub total_employees: usize,
    pub active_employees: usize,
    pub department_count: usize,
    pub present_today: usize,
    pub attendance_rate: u32,
    pub top_departments: Vec<DepartmentHeadcount>,
    pub recent_attendance: Vec<RecentAttendance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub department: Department,
    pub employee_count: usize,
    pub manager: Option<Employee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentOverview {
    pub total_employees: usize,
    pub total_departments: usize,
    pub average_per_department: u32,
    pub largest_department: String,
    pub departments: Vec<DepartmentSummary>,
}

/// Employee search criteria; every criterion is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    #[serde(default, rename = "q")]
    pub term: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
}

// ============================================================================
// Pure aggregations
// ============================================================================

/// round(part / whole * 100), 0 when whole is 0
pub fn rate(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

fn active_count(employees: &[Employee]) -> usize {
    employees.iter().filter(|e| e.is_active()).count()
}

fn count_status(records: &[&AttendanceRecord], status: AttendanceStatus) -> usize {
    records.iter().filter(|r| r.status == Some(status)).count()
}

pub fn attendance_summary(
    date: NaiveDate,
    employees: &[Employee],
    attendance: &[AttendanceRecord],
) -> AttendanceSummary {
    let day: Vec<&AttendanceRecord> = attendance.iter().filter(|r| r.date == Some(date)).collect();
    let total = active_count(employees);
    let present = count_status(&day, AttendanceStatus::Present);

    AttendanceSummary {
        date,
        present,
        absent: count_status(&day, AttendanceStatus::Absent),
        late: count_status(&day, AttendanceStatus::Late),
        half_day: count_status(&day, AttendanceStatus::HalfDay),
        total,
        marked: day.len(),
        unmarked: total.saturating_sub(day.len()),
        attendance_rate: rate(present, total),
    }
}

/// Sunday of the week containing `date`, `None` below the calendar range
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

/// One entry per day of the Sunday-to-Saturday week containing `date`.
/// Rejects dates whose week falls outside the calendar range.
pub fn weekly_summary(
    date: NaiveDate,
    employees: &[Employee],
    attendance: &[AttendanceRecord],
) -> Result<Vec<DaySummary>, ValidationError> {
    let start = week_start(date)
        .filter(|start| start.checked_add_days(Days::new(6)).is_some())
        .ok_or_else(|| {
            ValidationError::field("date", format!("Week containing {} is out of range", date))
        })?;

    let total = active_count(employees);
    Ok(start
        .iter_days()
        .take(7)
        .map(|day| {
            let present = attendance
                .iter()
                .filter(|r| r.date == Some(day) && r.status == Some(AttendanceStatus::Present))
                .count();
            DaySummary {
                date: day,
                present,
                total,
                rate: rate(present, total),
            }
        })
        .collect())
}

fn members<'a>(department: &'a Department, employees: &'a [Employee]) -> impl Iterator<Item = &'a Employee> {
    employees
        .iter()
        .filter(move |e| department.name.is_some() && e.department == department.name)
}

/// Departments by employee count, largest first; ties keep department order
pub fn department_headcounts(
    departments: &[Department],
    employees: &[Employee],
) -> Vec<DepartmentHeadcount> {
    let mut counts: Vec<DepartmentHeadcount> = departments
        .iter()
        .map(|department| DepartmentHeadcount {
            department: department.clone(),
            employee_count: members(department, employees).count(),
            active_count: members(department, employees)
                .filter(|e| e.is_active())
                .count(),
        })
        .collect();
    counts.sort_by(|a, b| b.employee_count.cmp(&a.employee_count));
    counts
}

fn find_employee(employees: &[Employee], id: Option<RecordId>) -> Option<Employee> {
    id.and_then(|id| employees.iter().find(|e| e.id == id).cloned())
}

/// Records dated within the seven days up to `date`, newest first
pub fn recent_attendance(
    date: NaiveDate,
    employees: &[Employee],
    attendance: &[AttendanceRecord],
    limit: usize,
) -> Vec<RecentAttendance> {
    let mut recent: Vec<&AttendanceRecord> = attendance
        .iter()
        .filter(|r| {
            r.date.is_some_and(|d| {
                let age = (date - d).num_days();
                (0..=RECENT_WINDOW_DAYS).contains(&age)
            })
        })
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    recent
        .into_iter()
        .take(limit)
        .map(|record| RecentAttendance {
            record: record.clone(),
            employee: find_employee(employees, record.employee_id),
        })
        .collect()
}

pub fn department_overview(
    departments: &[Department],
    employees: &[Employee],
) -> DepartmentOverview {
    let summaries: Vec<DepartmentSummary> = departments
        .iter()
        .map(|department| DepartmentSummary {
            department: department.clone(),
            employee_count: members(department, employees).count(),
            manager: find_employee(employees, department.manager_id),
        })
        .collect();

    // First department wins a tie
    let largest = summaries
        .iter()
        .fold(None::<&DepartmentSummary>, |best, s| match best {
            Some(b) if b.employee_count >= s.employee_count => Some(b),
            _ => Some(s),
        })
        .and_then(|s| s.department.name.clone())
        .unwrap_or_else(|| "N/A".to_string());

    let average = if departments.is_empty() {
        0
    } else {
        (employees.len() as f64 / departments.len() as f64).round() as u32
    };

    DepartmentOverview {
        total_employees: employees.len(),
        total_departments: departments.len(),
        average_per_department: average,
        largest_department: largest,
        departments: summaries,
    }
}

pub fn filter_employees(employees: Vec<Employee>, filter: &EmployeeFilter) -> Vec<Employee> {
    let term = filter
        .term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    employees
        .into_iter()
        .filter(|e| {
            let matches_term = term.as_deref().map_or(true, |term| {
                [&e.first_name, &e.last_name, &e.email, &e.role]
                    .into_iter()
                    .flatten()
                    .any(|v| v.to_lowercase().contains(term))
            });
            let matches_department = filter
                .department
                .as_deref()
                .map_or(true, |d| e.department.as_deref() == Some(d));
            let matches_status = filter.status.map_or(true, |s| e.status == Some(s));
            matches_term && matches_department && matches_status
        })
        .collect()
}

// ============================================================================
// Service
// ============================================================================

pub struct ReportService {
    repositories: Repositories,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repositories,
            clock,
        }
    }

    fn resolve(&self, date: Option<NaiveDate>) -> NaiveDate {
        date.unwrap_or_else(|| today(self.clock.as_ref()))
    }

    #[instrument(skip(self))]
    pub async fn today_attendance(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<AttendanceSummary, RepositoryError> {
        let date = self.resolve(date);
        let (employees, attendance) = futures::try_join!(
            self.repositories.employees.list(),
            self.repositories.attendance.list()
        )?;
        Ok(attendance_summary(date, &employees, &attendance))
    }

    #[instrument(skip(self))]
    pub async fn weekly_attendance(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DaySummary>, RepositoryError> {
        let date = self.resolve(date);
        let (employees, attendance) = futures::try_join!(
            self.repositories.employees.list(),
            self.repositories.attendance.list()
        )?;
        weekly_summary(date, &employees, &attendance).map_err(RepositoryError::from)
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, date: Option<NaiveDate>) -> Result<Dashboard, RepositoryError> {
        let date = self.resolve(date);
        let (employees, departments, attendance) = futures::try_join!(
            self.repositories.employees.list(),
            self.repositories.departments.list(),
            self.repositories.attendance.list()
        )?;
        debug!(
            employees = employees.len(),
            departments = departments.len(),
            attendance = attendance.len(),
            "Building dashboard"
        );

        let today = attendance_summary(date, &employees, &attendance);
        let mut top_departments = department_headcounts(&departments, &employees);
        top_departments.truncate(TOP_DEPARTMENTS);

        Ok(Dashboard {
            date,
            total_employees: employees.len(),
            active_employees: today.total,
            department_count: departments.len(),
            present_today: today.present,
            attendance_rate: today.attendance_rate,
            top_departments,
            recent_attendance: recent_attendance(date, &employees, &attendance, RECENT_ATTENDANCE),
        })
    }

    #[instrument(skip(self))]
    pub async fn department_overview(&self) -> Result<DepartmentOverview, RepositoryError> {
        let (employees, departments) = futures::try_join!(
            self.repositories.employees.list(),
            self.repositories.departments.list()
        )?;
        Ok(department_overview(&departments, &employees))
    }

    #[instrument(skip(self))]
    pub async fn search_employees(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Vec<Employee>, RepositoryError> {
        let employees = self.repositories.employees.list().await?;
        Ok(filter_employees(employees, filter))
    }
}

// Field validation applied at the HTTP boundary before records reach a repository

use crate::errors::{FieldError, ValidationError};
use crate::models::{AttendancePatch, DepartmentPatch, EmployeePatch, OnboardingStepPatch};
use regex::Regex;

lazy_static::lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern");
}

/// Create requires the mandatory fields; update only checks what is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Collects field errors in the order they are checked
#[derive(Debug, Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn required_text(&mut self, mode: ValidationMode, field: &str, label: &str, value: Option<&str>) {
        let blank = value.map_or(true, |v| v.trim().is_empty());
        match (mode, value) {
            (ValidationMode::Create, _) if blank => self.fail(field, format!("{} is required", label)),
            (ValidationMode::Update, Some(_)) if blank => {
                self.fail(field, format!("{} cannot be blank", label))
            }
            _ => {}
        }
    }

    fn required<T>(&mut self, mode: ValidationMode, field: &str, label: &str, value: Option<&T>) {
        if mode == ValidationMode::Create && value.is_none() {
            self.fail(field, format!("{} is required", label));
        }
    }

    fn fail(&mut self, field: &str, message: String) {
        // One message per field; the first failing check wins
        if !self.errors.iter().any(|e| e.field == field) {
            self.errors.push(FieldError::new(field, message));
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(self.errors))
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn validate_employee(patch: &EmployeePatch, mode: ValidationMode) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    checks.required_text(mode, "firstName", "First name", patch.first_name.as_deref());
    checks.required_text(mode, "lastName", "Last name", patch.last_name.as_deref());
    checks.required_text(mode, "email", "Email", patch.email.as_deref());
    checks.required_text(mode, "phone", "Phone", patch.phone.as_deref());
    checks.required_text(mode, "role", "Role", patch.role.as_deref());
    checks.required_text(mode, "department", "Department", patch.department.as_deref());
    checks.required(mode, "startDate", "Start date", patch.start_date.as_ref());

    if let Some(email) = patch.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !is_valid_email(email) {
            checks.fail("email", "Please enter a valid email address".to_string());
        }
    }
    if let Some(salary) = patch.salary {
        if !salary.is_finite() || salary < 0.0 {
            checks.fail("salary", "Salary must be a non-negative number".to_string());
        }
    }
    checks.finish()
}

pub fn validate_department(
    patch: &DepartmentPatch,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    checks.required_text(mode, "name", "Name", patch.name.as_deref());
    checks.finish()
}

pub fn validate_attendance(
    patch: &AttendancePatch,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    checks.required(mode, "employeeId", "Employee", patch.employee_id.as_ref());
    checks.required(mode, "date", "Date", patch.date.as_ref());
    checks.required(mode, "status", "Status", patch.status.as_ref());
    if let (Some(check_in), Some(check_out)) = (patch.check_in, patch.check_out) {
        if check_out < check_in {
            checks.fail("checkOut", "Check-out must not be before check-in".to_string());
        }
    }
    checks.finish()
}

pub fn validate_onboarding_step(
    patch: &OnboardingStepPatch,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    checks.required_text(mode, "title", "Title", patch.title.as_deref());
    checks.finish()
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Debug};

/// Integer identifier assigned by a repository on create
pub type RecordId = i64;

/// A typed entity stored in a repository.
///
/// Every record carries an immutable `Id`; all other fields are optional so a
/// record holds exactly what its creator supplied. `Patch` is the partial
/// field set accepted by create and update.
pub trait Record:
    Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Patch: Debug + Clone + Default + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Singular entity name used in errors and logs
    const ENTITY: &'static str;

    /// Path segment of the collection on the HTTP surface
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;

    /// Build a new record from a patch, ignoring any `Id` the patch carries
    fn from_patch(id: RecordId, patch: Self::Patch) -> Self;

    /// Shallow merge: fields present in the patch overwrite, absent fields are kept.
    /// The `Id` is never touched.
    fn merge(&mut self, patch: Self::Patch);
}

macro_rules! impl_record {
    ($record:ident, $patch:ident, $entity:literal, $collection:literal, [$($field:ident),+ $(,)?]) => {
        impl_record!($record, $patch, $entity, $collection, [$($field),+], clearable []);
    };
    (
        $record:ident, $patch:ident, $entity:literal, $collection:literal,
        [$($field:ident),+ $(,)?],
        clearable [$($clearable:ident),* $(,)?]
    ) => {
        impl Record for $record {
            type Patch = $patch;

            const ENTITY: &'static str = $entity;
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> RecordId {
                self.id
            }

            fn from_patch(id: RecordId, patch: $patch) -> Self {
                Self {
                    id,
                    $($field: patch.$field,)+
                    $($clearable: patch.$clearable.flatten(),)*
                }
            }

            fn merge(&mut self, patch: $patch) {
                $(
                    if let Some(value) = patch.$field {
                        self.$field = Some(value);
                    }
                )+
                $(
                    if let Some(value) = patch.$clearable {
                        self.$clearable = value;
                    }
                )*
            }
        }
    };
}

/// Deserialize a clearable patch field: absent stays `None`, an explicit
/// `null` becomes `Some(None)`
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Status enums
// ============================================================================

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
            EmployeeStatus::OnLeave => "on-leave",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily attendance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::HalfDay => "half-day",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an onboarding step, a per-employee completion entry, or an
/// employee's onboarding as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::Pending => "pending",
            OnboardingStatus::InProgress => "in_progress",
            OnboardingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPriority {
    High,
    Medium,
    Low,
}

// ============================================================================
// Employee
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub phone: String,
}

/// One entry of an employee's onboarding completion list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCompletion {
    pub step_id: RecordId,
    pub status: OnboardingStatus,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub document_url: Option<String>,
}

/// Per-employee onboarding record, the canonical source of step completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRecord {
    pub status: OnboardingStatus,
    #[serde(default)]
    pub completed_steps: Vec<StepCompletion>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
}

impl OnboardingRecord {
    pub fn started_at(start_date: DateTime<Utc>) -> Self {
        Self {
            status: OnboardingStatus::Pending,
            completed_steps: Vec::new(),
            start_date,
            completion_date: None,
        }
    }

    pub fn completion_for(&self, step_id: RecordId) -> Option<&StepCompletion> {
        self.completed_steps.iter().find(|c| c.step_id == step_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub salary: Option<f64>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub photo_url: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub onboarding: Option<OnboardingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub onboarding: Option<OnboardingRecord>,
}

impl_record!(
    Employee,
    EmployeePatch,
    "Employee",
    "employees",
    [
        first_name,
        last_name,
        email,
        phone,
        role,
        department,
        start_date,
        status,
        salary,
        bio,
        skills,
        photo_url,
        address,
        emergency_contact,
        onboarding,
    ]
);

impl Employee {
    /// "First Last", skipping missing parts
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(EmployeeStatus::Active)
    }
}

// ============================================================================
// Department
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Employee id of the manager; may dangle
    pub manager_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub manager_id: Option<RecordId>,
}

impl_record!(
    Department,
    DepartmentPatch,
    "Department",
    "departments",
    [name, description, location, manager_id]
);

// ============================================================================
// Attendance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// May reference an employee that no longer exists
    pub employee_id: Option<RecordId>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub employee_id: Option<RecordId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(
    AttendanceRecord,
    AttendancePatch,
    "Attendance record",
    "attendance",
    [employee_id, date, status, check_in, check_out, notes]
);

// ============================================================================
// Onboarding steps
// ============================================================================

/// A step of the onboarding checklist shared by all employees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStep {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<StepPriority>,
    pub status: Option<OnboardingStatus>,
    pub estimated_time: Option<String>,
    pub required_documents: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStepPatch {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<StepPriority>,
    #[serde(default)]
    pub status: Option<OnboardingStatus>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub required_documents: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<String>,
    /// `null` clears the timestamp
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl_record!(
    OnboardingStep,
    OnboardingStepPatch,
    "Onboarding step",
    "onboarding-steps",
    [
        title,
        description,
        category,
        priority,
        status,
        estimated_time,
        required_documents,
        instructions,
    ],
    clearable [completed_at]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_serializes_with_capital_id_and_camel_case() {
        let employee = Employee::from_patch(
            3,
            EmployeePatch {
                first_name: Some("Ann".to_string()),
                status: Some(EmployeeStatus::OnLeave),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["Id"], 3);
        assert_eq!(json["firstName"], "Ann");
        assert_eq!(json["status"], "on-leave");
    }

    #[test]
    fn test_from_patch_ignores_patch_id() {
        let patch = DepartmentPatch {
            id: Some(99),
            name: Some("Engineering".to_string()),
            ..Default::default()
        };
        let department = Department::from_patch(4, patch);
        assert_eq!(department.id, 4);
        assert_eq!(department.name.as_deref(), Some("Engineering"));
    }

    #[test]
    fn test_merge_overwrites_present_and_keeps_absent_fields() {
        let mut record = AttendanceRecord::from_patch(
            1,
            AttendancePatch {
                employee_id: Some(2),
                status: Some(AttendanceStatus::Late),
                notes: Some("traffic".to_string()),
                ..Default::default()
            },
        );
        record.merge(AttendancePatch {
            id: Some(50),
            status: Some(AttendanceStatus::Present),
            ..Default::default()
        });
        assert_eq!(record.id, 1);
        assert_eq!(record.status, Some(AttendanceStatus::Present));
        assert_eq!(record.employee_id, Some(2));
        assert_eq!(record.notes.as_deref(), Some("traffic"));
    }

    #[test]
    fn test_patch_null_fields_deserialize_as_absent() {
        let patch: EmployeePatch =
            serde_json::from_str(r#"{"firstName": null, "status": "active"}"#).unwrap();
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.status, Some(EmployeeStatus::Active));
    }

    #[test]
    fn test_step_completed_at_cleared_by_explicit_null() {
        let mut step = OnboardingStep::from_patch(
            1,
            OnboardingStepPatch {
                title: Some("Paperwork".to_string()),
                completed_at: Some(Some(Utc::now())),
                ..Default::default()
            },
        );
        assert!(step.completed_at.is_some());

        let untouched: OnboardingStepPatch =
            serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(untouched.completed_at, None);
        step.merge(untouched);
        assert!(step.completed_at.is_some());

        let clearing: OnboardingStepPatch =
            serde_json::from_str(r#"{"completedAt": null}"#).unwrap();
        assert_eq!(clearing.completed_at, Some(None));
        step.merge(clearing.clone());
        assert_eq!(step.completed_at, None);
        assert_eq!(step.title.as_deref(), Some("Paperwork"));

        let json = serde_json::to_value(&clearing).unwrap();
        assert!(json["completedAt"].is_null());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::HalfDay).unwrap(),
            "\"half-day\""
        );
        assert_eq!(
            serde_json::to_string(&OnboardingStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&StepPriority::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_full_name_skips_missing_parts() {
        let employee = Employee::from_patch(
            1,
            EmployeePatch {
                last_name: Some("Lee".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(employee.full_name(), "Lee");
    }
}

// Seed data for the in-memory repositories

use crate::errors::SeedError;
use crate::models::{
    AttendanceRecord, Department, Employee, OnboardingStatus, OnboardingStep, Record,
    OnboardingStepPatch, StepPriority,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial contents of the four collections, keyed like the record backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub onboarding_steps: Vec<OnboardingStep>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(|e| SeedError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let seed = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "Seed data loaded");
        Ok(seed)
    }

    /// Empty collections apart from the standard onboarding checklist
    pub fn with_default_steps() -> Self {
        Self {
            onboarding_steps: default_onboarding_steps(),
            ..Default::default()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn step(
    id: i64,
    title: &str,
    description: &str,
    category: &str,
    priority: StepPriority,
    estimated_time: &str,
    required_documents: &[&str],
    instructions: &str,
) -> OnboardingStep {
    OnboardingStep::from_patch(
        id,
        OnboardingStepPatch {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            priority: Some(priority),
            status: Some(OnboardingStatus::Pending),
            estimated_time: Some(estimated_time.to_string()),
            required_documents: Some(required_documents.iter().map(|d| d.to_string()).collect()),
            instructions: Some(instructions.to_string()),
            ..Default::default()
        },
    )
}

/// The onboarding checklist every new employee goes through
pub fn default_onboarding_steps() -> Vec<OnboardingStep> {
    vec![
        step(
            1,
            "Complete personal information",
            "Provide contact details, address and emergency contact",
            "Documentation",
            StepPriority::High,
            "15 minutes",
            &["Government-issued ID"],
            "Fill in the personal information form and upload a scan of your ID.",
        ),
        step(
            2,
            "Sign employment contract",
            "Review and sign the employment agreement",
            "Legal",
            StepPriority::High,
            "30 minutes",
            &["Signed employment contract"],
            "Read the contract carefully, sign every page and upload the signed copy.",
        ),
        step(
            3,
            "Submit tax forms",
            "Provide tax withholding and bank details for payroll",
            "Finance",
            StepPriority::High,
            "20 minutes",
            &["Tax withholding form", "Bank account details"],
            "Download the forms from the HR portal, complete them and upload both.",
        ),
        step(
            4,
            "IT equipment setup",
            "Receive a laptop and set up accounts",
            "IT",
            StepPriority::Medium,
            "1 hour",
            &[],
            "Collect your equipment from IT and follow the account setup guide.",
        ),
        step(
            5,
            "Security and compliance training",
            "Complete the mandatory security awareness course",
            "Training",
            StepPriority::Medium,
            "2 hours",
            &["Training completion certificate"],
            "Finish the online course and upload the completion certificate.",
        ),
        step(
            6,
            "Meet your team",
            "Introductory meetings with your manager and teammates",
            "Team",
            StepPriority::Low,
            "1 day",
            &[],
            "Your manager will schedule introductions during your first week.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_steps_have_unique_sequential_ids() {
        let steps = default_onboarding_steps();
        let ids: HashSet<_> = steps.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), steps.len());
        assert_eq!(steps.first().map(|s| s.id), Some(1));
        assert!(steps
            .iter()
            .all(|s| s.status == Some(OnboardingStatus::Pending)));
    }

    #[test]
    fn test_from_json_with_partial_collections() {
        let seed = SeedData::from_json(
            r#"{
                "employees": [
                    {"Id": 4, "firstName": "Ann", "lastName": "Lee", "status": "active",
                     "startDate": "2024-03-01"}
                ],
                "onboardingSteps": [{"Id": 1, "title": "Paperwork"}]
            }"#,
        )
        .unwrap();
        assert_eq!(seed.employees.len(), 1);
        assert_eq!(seed.employees[0].id, 4);
        assert!(seed.departments.is_empty());
        assert_eq!(seed.onboarding_steps[0].title.as_deref(), Some("Paperwork"));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        assert!(matches!(
            SeedData::from_json("{\"employees\": 3}"),
            Err(SeedError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            SeedData::load(&missing),
            Err(SeedError::Read { .. })
        ));
    }

    #[test]
    fn test_bundled_demo_seed_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/seed.json");
        let seed = SeedData::load(&path).unwrap();
        assert_eq!(seed.employees.len(), 3);
        assert_eq!(seed.departments[0].manager_id, Some(1));
        assert_eq!(seed.onboarding_steps.len(), 2);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"departments": [{"Id": 2, "name": "Eng"}]}"#).unwrap();
        let seed = SeedData::load(&path).unwrap();
        assert_eq!(seed.departments[0].name.as_deref(), Some("Eng"));
    }
}

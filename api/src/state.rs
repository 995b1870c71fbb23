use std::sync::Arc;

use common::attendance::AttendanceService;
use common::clock::Clock;
use common::config::Settings;
use common::onboarding::{DocumentIntake, OnboardingService};
use common::reports::ReportService;
use common::repository::Repositories;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub onboarding: Arc<OnboardingService>,
    pub attendance: Arc<AttendanceService>,
    pub reports: Arc<ReportService>,
    pub config: Arc<Settings>,
}

impl AppState {
    /// Wire the services over one set of repositories
    pub fn new(repositories: Repositories, config: Settings, clock: Arc<dyn Clock>) -> Self {
        let documents = DocumentIntake::new(
            config.uploads.base_url.clone(),
            config.uploads.max_bytes,
            clock.clone(),
        );
        let onboarding = OnboardingService::new(
            repositories.employees.clone(),
            repositories.onboarding_steps.clone(),
            documents,
            clock.clone(),
        );
        let attendance = AttendanceService::new(repositories.attendance.clone());
        let reports = ReportService::new(repositories.clone(), clock);

        Self {
            repositories,
            onboarding: Arc::new(onboarding),
            attendance: Arc::new(attendance),
            reports: Arc::new(reports),
            config: Arc::new(config),
        }
    }
}

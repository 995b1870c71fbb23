// Repository layer: one repository per entity kind, the sole mutation path for its collection

pub mod memory;
pub mod remote;
pub mod seed;
pub mod simulation;

pub use memory::InMemoryRepository;
pub use remote::RemoteRepository;
pub use seed::SeedData;
pub use simulation::{FaultInjector, FaultPolicy, LatencyProfile, Simulation};

use crate::config::{BackendConfig, BackendMode};
use crate::errors::RepositoryError;
use crate::models::{AttendanceRecord, Department, Employee, OnboardingStep, Record, RecordId};
use anyhow::Context;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Repository operations, used for latency profiles, fault injection and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CRUD contract shared by the in-memory and remote repositories.
///
/// Every returned record is an owned snapshot; mutating it never affects the
/// stored collection. `NotFound` is the only domain error of the in-memory
/// variant; the remote variant may also surface `Validation` and `Transport`.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// All records in insertion order
    async fn list(&self) -> Result<Vec<R>, RepositoryError>;

    async fn get_by_id(&self, id: RecordId) -> Result<R, RepositoryError>;

    /// Assign the next id (max + 1, or 1 when empty) and append
    async fn create(&self, patch: R::Patch) -> Result<R, RepositoryError>;

    /// Shallow-merge the patch into the stored record; the id is pinned
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, RepositoryError>;

    /// Remove and return the record. Deleting a missing id is `NotFound`.
    async fn delete(&self, id: RecordId) -> Result<R, RepositoryError>;
}

/// The four repositories of the application, built once at startup and shared
#[derive(Clone)]
pub struct Repositories {
    pub employees: Arc<dyn Repository<Employee>>,
    pub departments: Arc<dyn Repository<Department>>,
    pub attendance: Arc<dyn Repository<AttendanceRecord>>,
    pub onboarding_steps: Arc<dyn Repository<OnboardingStep>>,
}

impl Repositories {
    /// In-memory repositories preloaded with `seed`, sharing one simulation harness
    pub fn in_memory(seed: SeedData, simulation: Simulation) -> Result<Self, crate::errors::SeedError> {
        let simulation = Arc::new(simulation);
        Ok(Self {
            employees: Arc::new(InMemoryRepository::with_records(
                seed.employees,
                simulation.clone(),
            )?),
            departments: Arc::new(InMemoryRepository::with_records(
                seed.departments,
                simulation.clone(),
            )?),
            attendance: Arc::new(InMemoryRepository::with_records(
                seed.attendance,
                simulation.clone(),
            )?),
            onboarding_steps: Arc::new(InMemoryRepository::with_records(
                seed.onboarding_steps,
                simulation,
            )?),
        })
    }

    /// Remote repositories sharing one HTTP client
    pub fn remote(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            employees: Arc::new(RemoteRepository::new(client.clone(), base_url, api_key.clone())),
            departments: Arc::new(RemoteRepository::new(
                client.clone(),
                base_url,
                api_key.clone(),
            )),
            attendance: Arc::new(RemoteRepository::new(
                client.clone(),
                base_url,
                api_key.clone(),
            )),
            onboarding_steps: Arc::new(RemoteRepository::new(client, base_url, api_key)),
        }
    }

    /// Build the repositories for the configured backend mode
    #[tracing::instrument(skip(config), fields(mode = ?config.mode))]
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        match config.mode {
            BackendMode::Memory => {
                let seed = match &config.seed_file {
                    Some(path) => SeedData::load(path)?,
                    None => SeedData::with_default_steps(),
                };
                tracing::info!(
                    employees = seed.employees.len(),
                    departments = seed.departments.len(),
                    attendance = seed.attendance.len(),
                    onboarding_steps = seed.onboarding_steps.len(),
                    "Seeding in-memory repositories"
                );
                let simulation = Simulation::from_config(&config.simulation);
                Ok(Self::in_memory(seed, simulation)?)
            }
            BackendMode::Remote => {
                let remote = config
                    .remote
                    .as_ref()
                    .context("remote backend selected without [backend.remote] settings")?;
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(remote.timeout_seconds))
                    .build()
                    .context("Failed to create HTTP client")?;
                tracing::info!(base_url = %remote.base_url, "Using remote record backend");
                Ok(Self::remote(client, &remote.base_url, remote.api_key.clone()))
            }
        }
    }
}

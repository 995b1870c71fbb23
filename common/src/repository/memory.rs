// In-memory repository: one ordered collection guarded by an async lock

use super::{Operation, Repository, Simulation};
use crate::errors::{RepositoryError, SeedError, ValidationError};
use crate::models::{Record, RecordId};
use crate::telemetry::observe;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Repository over a process-local collection.
///
/// Clones share the same collection. Concurrent writers are serialized per
/// operation only; there is no isolation across operations (last writer wins).
pub struct InMemoryRepository<R: Record> {
    records: Arc<RwLock<Vec<R>>>,
    simulation: Arc<Simulation>,
}

impl<R: Record> Clone for InMemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            simulation: self.simulation.clone(),
        }
    }
}

impl<R: Record> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new(Arc::new(Simulation::disabled()))
    }
}

impl<R: Record> InMemoryRepository<R> {
    /// Create an empty repository
    pub fn new(simulation: Arc<Simulation>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            simulation,
        }
    }

    /// Create a repository preloaded with records that keep their ids.
    /// Later creates continue from the highest seeded id.
    pub fn with_records(records: Vec<R>, simulation: Arc<Simulation>) -> Result<Self, SeedError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(SeedError::DuplicateId {
                    entity: R::ENTITY,
                    id: record.id(),
                });
            }
        }
        if next_id(&records).is_none() {
            return Err(SeedError::IdsExhausted { entity: R::ENTITY });
        }

        Ok(Self {
            records: Arc::new(RwLock::new(records)),
            simulation,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Number of stored records, bypassing latency and faults
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// max(Id) + 1, or 1 for an empty collection; `None` once the id space is used up
fn next_id<R: Record>(records: &[R]) -> Option<RecordId> {
    records
        .iter()
        .map(Record::id)
        .max()
        .map_or(Some(1), |max| max.checked_add(1))
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn list(&self) -> Result<Vec<R>, RepositoryError> {
        observe(R::ENTITY, Operation::List, async {
            self.simulation.before(Operation::List).await?;
            let records = self.records.read().await;
            debug!(count = records.len(), "Listed records");
            Ok(records.clone())
        })
        .await
    }

    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn get_by_id(&self, id: RecordId) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Get, async {
            self.simulation.before(Operation::Get).await?;
            let records = self.records.read().await;
            records
                .iter()
                .find(|r| r.id() == id)
                .cloned()
                .ok_or_else(|| RepositoryError::not_found(R::ENTITY, id))
        })
        .await
    }

    #[instrument(skip(self, patch), fields(entity = R::ENTITY))]
    async fn create(&self, patch: R::Patch) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Create, async move {
            self.simulation.before(Operation::Create).await?;
            let mut records = self.records.write().await;
            let id = next_id(&records).ok_or_else(|| {
                ValidationError::field("Id", format!("No {} ids left to assign", R::ENTITY))
            })?;
            let record = R::from_patch(id, patch);
            records.push(record.clone());
            info!(id, "Record created");
            Ok(record)
        })
        .await
    }

    #[instrument(skip(self, patch), fields(entity = R::ENTITY))]
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Update, async move {
            self.simulation.before(Operation::Update).await?;
            let mut records = self.records.write().await;
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| RepositoryError::not_found(R::ENTITY, id))?;
            record.merge(patch);
            info!(id, "Record updated");
            Ok(record.clone())
        })
        .await
    }

    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn delete(&self, id: RecordId) -> Result<R, RepositoryError> {
        observe(R::ENTITY, Operation::Delete, async {
            self.simulation.before(Operation::Delete).await?;
            let mut records = self.records.write().await;
            let index = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| RepositoryError::not_found(R::ENTITY, id))?;
            let removed = records.remove(index);
            info!(id, "Record deleted");
            Ok(removed)
        })
        .await
    }
}

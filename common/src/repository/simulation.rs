// Simulated latency and fault injection for the in-memory repositories

use super::Operation;
use crate::config::{LatencyPreset, SimulationConfig};
use crate::errors::RepositoryError;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Delay awaited before each operation takes effect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl LatencyProfile {
    /// No delay at all, used by tests
    pub fn none() -> Self {
        Self::default()
    }

    pub fn uniform(delay: Duration) -> Self {
        Self {
            list: delay,
            get: delay,
            create: delay,
            update: delay,
            delete: delay,
        }
    }

    /// Delays resembling a hosted record store: reads 200-300ms, writes 250-400ms
    pub fn interactive() -> Self {
        Self {
            list: Duration::from_millis(300),
            get: Duration::from_millis(200),
            create: Duration::from_millis(400),
            update: Duration::from_millis(350),
            delete: Duration::from_millis(250),
        }
    }

    pub fn delay_for(&self, operation: Operation) -> Duration {
        match operation {
            Operation::List => self.list,
            Operation::Get => self.get,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// When the injector fails an operation
#[derive(Debug, Clone, PartialEq)]
pub enum FaultPolicy {
    Never,
    /// Fail the n-th, 2n-th, ... operation
    EveryNth(u64),
    /// Fail each operation independently with this probability
    Probability(f64),
}

/// Injects `Transport` failures before an operation takes effect
#[derive(Debug)]
pub struct FaultInjector {
    policy: FaultPolicy,
    calls: AtomicU64,
    forced: AtomicU64,
}

impl FaultInjector {
    pub fn new(policy: FaultPolicy) -> Self {
        Self {
            policy,
            calls: AtomicU64::new(0),
            forced: AtomicU64::new(0),
        }
    }

    /// Force the next `count` operations to fail regardless of the policy
    pub fn fail_next(&self, count: u64) {
        self.forced.fetch_add(count, Ordering::SeqCst);
    }

    fn take_forced(&self) -> bool {
        self.forced
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn check(&self, operation: Operation) -> Result<(), RepositoryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let fail = self.take_forced()
            || match self.policy {
                FaultPolicy::Never => false,
                FaultPolicy::EveryNth(n) => n > 0 && call % n == 0,
                FaultPolicy::Probability(p) => rand::thread_rng().gen_bool(p.clamp(0.0, 1.0)),
            };

        if fail {
            tracing::warn!(operation = %operation, call, "Injected repository fault");
            return Err(RepositoryError::Transport(format!(
                "injected fault on {} (call {})",
                operation, call
            )));
        }
        Ok(())
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new(FaultPolicy::Never)
    }
}

/// Latency plus fault injection applied ahead of every in-memory operation
#[derive(Debug, Default)]
pub struct Simulation {
    pub latency: LatencyProfile,
    pub faults: FaultInjector,
}

impl Simulation {
    pub fn new(latency: LatencyProfile, faults: FaultInjector) -> Self {
        Self { latency, faults }
    }

    /// Zero latency, no faults
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let latency = match config.latency_preset {
            Some(LatencyPreset::Interactive) => LatencyProfile::interactive(),
            None => LatencyProfile {
                list: Duration::from_millis(config.list_ms),
                get: Duration::from_millis(config.get_ms),
                create: Duration::from_millis(config.create_ms),
                update: Duration::from_millis(config.update_ms),
                delete: Duration::from_millis(config.delete_ms),
            },
        };
        let policy = match (config.fail_every_nth, config.failure_rate) {
            (Some(n), _) => FaultPolicy::EveryNth(n),
            (None, Some(rate)) if rate > 0.0 => FaultPolicy::Probability(rate),
            _ => FaultPolicy::Never,
        };
        Self::new(latency, FaultInjector::new(policy))
    }

    /// Await the configured delay, then decide whether the operation fails.
    /// A failed operation has no effect on the collection.
    pub async fn before(&self, operation: Operation) -> Result<(), RepositoryError> {
        let delay = self.latency.delay_for(operation);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.faults.check(operation)
    }
}

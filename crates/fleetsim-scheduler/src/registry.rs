//! Fleet registry: the host list plus the active placement strategy

use fleetsim_core::{FleetsimError, FleetsimResult, Host, UtilizationSnapshot, Workload};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::placement::PlacementStrategy;

struct FleetState {
    hosts: Vec<Host>,
    strategy: Box<dyn PlacementStrategy>,
}

/// Owns the fleet and the strategy used to place workloads on it.
///
/// Every read or mutation of host state, including the strategy's own
/// state, goes through one fleet-wide lock. The strategy is fixed for the
/// lifetime of the registry.
pub struct FleetRegistry {
    state: RwLock<FleetState>,
}

impl FleetRegistry {
    /// Create an empty registry
    pub fn new(strategy: Box<dyn PlacementStrategy>) -> Self {
        Self::with_hosts(strategy, Vec::new())
    }

    /// Create a registry over an existing host list
    pub fn with_hosts(strategy: Box<dyn PlacementStrategy>, hosts: Vec<Host>) -> Self {
        info!(
            strategy = strategy.name(),
            hosts = hosts.len(),
            "Fleet registry initialized"
        );

        Self {
            state: RwLock::new(FleetState { hosts, strategy }),
        }
    }

    /// Add a host. Duplicate ids are not rejected.
    pub async fn add_host(&self, host: Host) {
        debug!(
            host = %host.id,
            cpu_cores = host.cpu_cores,
            memory_mb = host.memory_mb,
            gpus = host.gpus.len(),
            "Host added"
        );
        self.state.write().await.hosts.push(host);
    }

    /// Place a batch of workloads with the active strategy
    pub async fn allocate_resources(&self, workloads: Vec<Workload>) -> FleetsimResult<()> {
        let mut state = self.state.write().await;
        let FleetState { hosts, strategy } = &mut *state;

        let count = workloads.len();
        match strategy.schedule(workloads, hosts) {
            Ok(()) => {
                info!(
                    strategy = strategy.name(),
                    workloads = count,
                    "Workloads allocated"
                );
                Ok(())
            }
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "Allocation failed");
                Err(e)
            }
        }
    }

    /// Fleet-wide averaged utilization
    pub async fn current_utilization(&self) -> UtilizationSnapshot {
        UtilizationSnapshot::from_hosts(&self.state.read().await.hosts)
    }

    /// Copy of the current host list
    pub async fn hosts(&self) -> Vec<Host> {
        self.state.read().await.hosts.clone()
    }

    pub async fn host_count(&self) -> usize {
        self.state.read().await.hosts.len()
    }

    pub async fn strategy_name(&self) -> &'static str {
        self.state.read().await.strategy.name()
    }

    /// Id of the host a workload is placed on
    pub async fn locate(&self, workload_id: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .hosts
            .iter()
            .find(|h| h.has_workload(workload_id))
            .map(|h| h.id.clone())
    }

    /// Run `f` with exclusive access to the host list.
    ///
    /// The lock is held for the whole call, so `f` runs to completion without
    /// interleaving with sampling or other mutations.
    pub async fn with_hosts_mut<R>(&self, f: impl FnOnce(&mut [Host]) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state.hosts)
    }

    /// Mutate a placed workload in place. No re-admission check is made.
    pub async fn update_workload<R>(
        &self,
        workload_id: &str,
        f: impl FnOnce(&mut Workload) -> R,
    ) -> FleetsimResult<R> {
        let mut state = self.state.write().await;
        let workload = state
            .hosts
            .iter_mut()
            .flat_map(|h| h.workloads.iter_mut())
            .find(|w| w.id == workload_id)
            .ok_or_else(|| FleetsimError::WorkloadNotFound(workload_id.to_string()))?;
        Ok(f(workload))
    }
}

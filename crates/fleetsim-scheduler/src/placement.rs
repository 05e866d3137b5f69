//! Placement strategy contract

use fleetsim_core::{can_place, FleetsimError, FleetsimResult, Host, StrategyKind, Workload};
use tracing::{debug, warn};

use crate::bin_packing::BinPackingStrategy;
use crate::fairness::ProportionalFairnessStrategy;
use crate::priority::PriorityStrategy;
use crate::round_robin::RoundRobinStrategy;

/// Strategy for placing a batch of pending workloads onto hosts.
///
/// `schedule` either places every workload or returns
/// [`FleetsimError::Unschedulable`] naming the first workload it could not
/// place. Workloads placed before the failure stay placed; there is no
/// rollback. Strategies never retry internally.
pub trait PlacementStrategy: Send + Sync {
    /// Short strategy name used in logs
    fn name(&self) -> &'static str;

    /// Place `workloads` onto `hosts`
    fn schedule(&mut self, workloads: Vec<Workload>, hosts: &mut [Host]) -> FleetsimResult<()>;
}

/// Build the strategy for a configured kind
pub fn build_strategy(kind: StrategyKind) -> Box<dyn PlacementStrategy> {
    match kind {
        StrategyKind::Priority => Box::new(PriorityStrategy),
        StrategyKind::BinPacking => Box::new(BinPackingStrategy),
        StrategyKind::RoundRobin => Box::new(RoundRobinStrategy::new()),
        StrategyKind::ProportionalFairness => Box::new(ProportionalFairnessStrategy::new()),
    }
}

/// Place each workload, in order, on the first host that admits it
pub(crate) fn place_first_fit(workloads: Vec<Workload>, hosts: &mut [Host]) -> FleetsimResult<()> {
    for workload in workloads {
        match hosts.iter().position(|h| can_place(&workload, h)) {
            Some(index) => place(workload, &mut hosts[index]),
            None => return Err(unschedulable(workload)),
        }
    }
    Ok(())
}

pub(crate) fn place(workload: Workload, host: &mut Host) {
    debug!(workload = %workload.id, host = %host.id, "Workload placed");
    host.add_workload(workload);
}

pub(crate) fn unschedulable(workload: Workload) -> FleetsimError {
    warn!(workload = %workload.id, "No host can admit workload");
    FleetsimError::Unschedulable(workload.id)
}

#[cfg(test)]
pub(crate) mod test_support {
    use fleetsim_core::{Gpu, Host, Workload};

    pub fn gpu() -> Gpu {
        Gpu::new("gpu-std", 4000, 0, 8192, 900, 10.0, 250)
    }

    pub fn host(id: &str, cores: u32) -> Host {
        let mut g = gpu();
        g.id = format!("{}-gpu", id);
        Host::new(id, cores, 65536).with_gpu(g)
    }

    pub fn workload(id: &str, cpu_millicores: u32, priority: i32) -> Workload {
        Workload::new(id, cpu_millicores, 1024, gpu(), priority)
    }

    /// Host id each workload ended up on, in fleet order
    pub fn placement(hosts: &[Host]) -> Vec<(String, String)> {
        hosts
            .iter()
            .flat_map(|h| h.workloads.iter().map(move |w| (w.id.clone(), h.id.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_build_strategy_names() {
        assert_eq!(build_strategy(StrategyKind::Priority).name(), "priority");
        assert_eq!(build_strategy(StrategyKind::BinPacking).name(), "bin-packing");
        assert_eq!(build_strategy(StrategyKind::RoundRobin).name(), "round-robin");
        assert_eq!(
            build_strategy(StrategyKind::ProportionalFairness).name(),
            "proportional-fairness"
        );
    }

    #[test]
    fn test_first_fit_keeps_partial_allocation() {
        // Each workload fits alone, but only two fit together
        let mut hosts = vec![host("a", 4)];
        let workloads = vec![
            workload("w1", 2000, 0),
            workload("w2", 2000, 0),
            workload("w3", 2000, 0),
        ];

        let err = place_first_fit(workloads, &mut hosts).unwrap_err();
        assert_eq!(err.workload_id(), Some("w3"));
        assert!(hosts[0].has_workload("w1"));
        assert!(hosts[0].has_workload("w2"));
    }

    #[test]
    fn test_first_fit_on_empty_fleet() {
        let err = place_first_fit(vec![workload("w1", 100, 0)], &mut []).unwrap_err();
        assert!(matches!(err, FleetsimError::Unschedulable(id) if id == "w1"));
    }
}

//! Proportional-fairness placement for GPU-scarce fleets

use fleetsim_core::{has_compute_headroom, FleetsimResult, Host, Workload};

use crate::placement::{place, unschedulable, PlacementStrategy};
use crate::reservation::{GpuShare, ReservationLedger};

/// Gives each workload a share of the fleet's unreserved CUDA cores
/// proportional to its CUDA-core requirement within the batch.
///
/// Unlike the other strategies this one consumes GPU capacity: every
/// placement reserves the derived share on a specific GPU. Reservations live
/// in a [`ReservationLedger`] keyed by GPU id, so the host's GPU records stay
/// untouched. Reservations are not released when the rebalancer later
/// migrates a workload.
#[derive(Debug, Default, Clone)]
pub struct ProportionalFairnessStrategy {
    ledger: ReservationLedger,
}

impl ProportionalFairnessStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    /// Share of the workload on a GPU, including the derived CUDA-core slice
    fn derived_share(workload: &Workload, total_need: u64, total_available: u64) -> GpuShare {
        let cuda_cores = if total_need == 0 {
            0
        } else {
            (workload.gpu.cuda_cores as f64 / total_need as f64 * total_available as f64) as u64
        };

        GpuShare {
            cuda_cores,
            vram_mb: workload.gpu.vram_mb,
            memory_bandwidth_gbps: workload.gpu.memory_bandwidth_gbps as u64,
            power_watts: workload.gpu.power_watts as u64,
        }
    }
}

impl PlacementStrategy for ProportionalFairnessStrategy {
    fn name(&self) -> &'static str {
        "proportional-fairness"
    }

    fn schedule(&mut self, workloads: Vec<Workload>, hosts: &mut [Host]) -> FleetsimResult<()> {
        let total_need: u64 = workloads.iter().map(|w| w.gpu.cuda_cores as u64).sum();
        let total_available: u64 = hosts
            .iter()
            .flat_map(|h| h.gpus.iter())
            .map(|g| self.ledger.remaining(g).cuda_cores)
            .sum();

        for workload in workloads {
            let share = Self::derived_share(&workload, total_need, total_available);

            let slot = hosts.iter().enumerate().find_map(|(index, host)| {
                if !has_compute_headroom(&workload, host) {
                    return None;
                }
                host.gpus
                    .iter()
                    .find(|g| self.ledger.remaining(g).covers(&share))
                    .map(|g| (index, g.id.clone()))
            });

            match slot {
                Some((index, gpu_id)) => {
                    self.ledger.reserve(&gpu_id, &workload.id, share);
                    place(workload, &mut hosts[index]);
                }
                None => return Err(unschedulable(workload)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetsim_core::Gpu;

    fn gpu(id: &str, cuda: u32) -> Gpu {
        Gpu::new(id, cuda, 0, 8192, 900, 10.0, 300)
    }

    fn workload(id: &str, cuda: u32) -> Workload {
        let mut requirement = gpu("req", cuda);
        requirement.vram_mb = 1024;
        requirement.memory_bandwidth_gbps = 100;
        requirement.power_watts = 50;
        Workload::new(id, 500, 512, requirement, 0)
    }

    fn fleet() -> Vec<Host> {
        vec![
            Host::new("a", 8, 16384).with_gpu(gpu("gpu-a", 4000)),
            Host::new("b", 8, 16384).with_gpu(gpu("gpu-b", 4000)),
        ]
    }

    #[test]
    fn test_equal_needs_get_equal_shares() {
        let mut hosts = fleet();
        let mut strategy = ProportionalFairnessStrategy::new();

        strategy
            .schedule(vec![workload("w1", 1000), workload("w2", 1000)], &mut hosts)
            .unwrap();

        // Each gets half of 8000 cores, so gpu-a is exhausted after w1
        assert_eq!(strategy.ledger().reserved("gpu-a").cuda_cores, 4000);
        assert_eq!(strategy.ledger().reserved("gpu-b").cuda_cores, 4000);
        assert_eq!(strategy.ledger().reserved("gpu-a").vram_mb, 1024);
        assert!(hosts[0].has_workload("w1"));
        assert!(hosts[1].has_workload("w2"));
    }

    #[test]
    fn test_gpu_records_are_not_mutated() {
        let mut hosts = fleet();
        let before = hosts[0].gpus[0].clone();
        let mut strategy = ProportionalFairnessStrategy::new();

        strategy
            .schedule(vec![workload("w1", 1000), workload("w2", 1000)], &mut hosts)
            .unwrap();

        assert_eq!(hosts[0].gpus[0], before);
        assert_eq!(strategy.ledger().remaining(&hosts[0].gpus[0]).cuda_cores, 0);
    }

    #[test]
    fn test_oversized_share_fails_after_partial_placement() {
        let mut hosts = fleet();
        let mut strategy = ProportionalFairnessStrategy::new();

        // Shares are 2000 and 6000 cores; no single GPU has 6000
        let err = strategy
            .schedule(vec![workload("w1", 1000), workload("w2", 3000)], &mut hosts)
            .unwrap_err();

        assert_eq!(err.workload_id(), Some("w2"));
        assert!(hosts[0].has_workload("w1"));
        assert_eq!(strategy.ledger().reserved("gpu-a").cuda_cores, 2000);
        assert_eq!(strategy.ledger().reserved("gpu-b"), GpuShare::default());
    }

    #[test]
    fn test_later_batches_see_remaining_capacity() {
        let mut hosts = fleet();
        let mut strategy = ProportionalFairnessStrategy::new();

        strategy
            .schedule(vec![workload("w1", 1000), workload("w2", 1000)], &mut hosts)
            .unwrap();

        // 7168 MB of VRAM is left on each GPU
        let mut w3 = workload("w3", 10);
        w3.gpu.vram_mb = 7500;
        let err = strategy.schedule(vec![w3], &mut hosts).unwrap_err();

        assert_eq!(err.workload_id(), Some("w3"));
    }

    #[test]
    fn test_respects_compute_headroom() {
        let mut hosts = vec![
            Host::new("a", 0, 16384).with_gpu(gpu("gpu-a", 4000)),
            Host::new("b", 8, 16384)
                .with_gpu(gpu("gpu-b1", 4000))
                .with_gpu(gpu("gpu-b2", 4000)),
        ];
        let mut strategy = ProportionalFairnessStrategy::new();

        // Shares are 4000 cores each; gpu-a is free but host a has no CPU
        let err = strategy
            .schedule(
                vec![workload("w1", 1000), workload("w2", 1000), workload("w3", 1000)],
                &mut hosts,
            )
            .unwrap_err();

        assert_eq!(err.workload_id(), Some("w3"));
        assert_eq!(strategy.ledger().reserved("gpu-b1").cuda_cores, 4000);
        assert_eq!(strategy.ledger().reserved("gpu-b2").cuda_cores, 4000);
        assert!(hosts[0].workloads.is_empty());
        assert_eq!(strategy.ledger().reserved("gpu-a"), GpuShare::default());
    }
}

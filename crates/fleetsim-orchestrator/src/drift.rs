//! Workload drift
//!
//! Perturbs the resource requests of placed workloads so that a running
//! simulation sees its load change, then asks the orchestrator to rebalance.
//! Perturbed requests are not re-admitted; a host may become overcommitted
//! until the next rebalancing pass drains it.

use fleetsim_core::DriftSettings;
use fleetsim_scheduler::FleetRegistry;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::orchestrator::Orchestrator;

/// One perturbed workload and its new requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEvent {
    pub workload_id: String,
    pub cpu_millicores: u32,
    pub memory_mb: u64,
}

/// Seeded source of request drift
pub struct WorkloadDrift {
    rng: SmallRng,
    max_change: f64,
    interval: Duration,
}

impl WorkloadDrift {
    pub fn new(seed: u64, max_change_percent: f64, interval: Duration) -> Self {
        let max_change = if max_change_percent.is_finite() {
            (max_change_percent.abs() / 100.0).min(1.0)
        } else {
            0.0
        };

        Self {
            rng: SmallRng::seed_from_u64(seed),
            max_change,
            interval,
        }
    }

    pub fn from_settings(settings: &DriftSettings) -> Self {
        Self::new(
            settings.seed,
            settings.max_change_percent,
            Duration::from_millis(settings.interval_ms),
        )
    }

    fn factor(&mut self) -> f64 {
        if self.max_change == 0.0 {
            return 1.0;
        }
        1.0 + self.rng.gen_range(-self.max_change..=self.max_change)
    }

    /// Scale the CPU and memory requests of one randomly chosen workload.
    ///
    /// Returns `None` when nothing is placed.
    pub async fn perturb(&mut self, registry: &FleetRegistry) -> Option<DriftEvent> {
        let placed: Vec<String> = registry
            .hosts()
            .await
            .into_iter()
            .flat_map(|host| host.workloads.into_iter().map(|w| w.id))
            .collect();
        if placed.is_empty() {
            return None;
        }

        let workload_id = &placed[self.rng.gen_range(0..placed.len())];
        let cpu_factor = self.factor();
        let memory_factor = self.factor();

        let updated = registry
            .update_workload(workload_id, |workload| {
                workload.cpu_millicores =
                    (workload.cpu_millicores as f64 * cpu_factor).round().max(0.0) as u32;
                workload.memory_mb =
                    (workload.memory_mb as f64 * memory_factor).round().max(0.0) as u64;
                (workload.cpu_millicores, workload.memory_mb)
            })
            .await;

        match updated {
            Ok((cpu_millicores, memory_mb)) => {
                debug!(
                    workload = %workload_id,
                    cpu_millicores,
                    memory_mb,
                    "Workload requests drifted"
                );
                Some(DriftEvent {
                    workload_id: workload_id.clone(),
                    cpu_millicores,
                    memory_mb,
                })
            }
            Err(e) => {
                debug!(error = %e, "Drift target disappeared");
                None
            }
        }
    }

    /// Perturb on every tick until `duration` elapses, triggering a
    /// reallocation after each change. Returns the number of perturbations.
    pub async fn run(mut self, orchestrator: Orchestrator, duration: Duration) -> usize {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting workload drift");

        let deadline = Instant::now() + duration;
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = sleep_until(deadline);
        tokio::pin!(stop);

        let mut perturbations = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    if self.perturb(orchestrator.registry()).await.is_some() {
                        perturbations += 1;
                        orchestrator.trigger_reallocation().await;
                    }
                }
            }
        }

        info!(perturbations, "Workload drift stopped");
        perturbations
    }
}

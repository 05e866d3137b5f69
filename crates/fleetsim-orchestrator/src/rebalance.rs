//! Greedy drain of overloaded hosts
//!
//! A pass works as follows:
//!
//! 1. Score every host by its load, the higher of its CPU and memory
//!    fractions.
//! 2. Visit hosts from most to least loaded, stopping at the first host
//!    below [`OVERLOAD_THRESHOLD`].
//! 3. For each workload on an overloaded host, pick the first host in fleet
//!    order that is below the threshold and admits the workload, and move
//!    the workload there.
//! 4. Rescore both hosts after each move and leave the source as soon as it
//!    drops below the threshold.
//!
//! The pass is single and best-effort. A workload with no destination stays
//! where it is, and a uniformly overloaded fleet is left untouched.

use fleetsim_core::{can_place, Host};
use serde::Serialize;
use tracing::{debug, info};

/// Load at or above which a host is drained, and below which it may receive
pub const OVERLOAD_THRESHOLD: f64 = 0.8;

/// One workload moved between hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    pub workload_id: String,
    pub source: String,
    pub destination: String,
}

/// Outcome of a rebalancing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebalanceReport {
    pub migrations: Vec<Migration>,
    /// Workloads on overloaded hosts that had no destination
    pub skipped: usize,
}

/// Run one rebalancing pass over `hosts`, mutating them in place
pub fn rebalance(hosts: &mut [Host]) -> RebalanceReport {
    let mut report = RebalanceReport::default();
    let mut loads: Vec<f64> = hosts.iter().map(Host::load).collect();

    let mut order: Vec<usize> = (0..hosts.len()).collect();
    order.sort_by(|&a, &b| loads[b].total_cmp(&loads[a]));

    for source in order {
        if loads[source] < OVERLOAD_THRESHOLD {
            break;
        }

        let candidates: Vec<String> = hosts[source]
            .workloads
            .iter()
            .map(|w| w.id.clone())
            .collect();

        for workload_id in candidates {
            let Some(workload) = hosts[source].workloads.iter().find(|w| w.id == workload_id)
            else {
                continue;
            };

            let destination = (0..hosts.len()).find(|&index| {
                index != source
                    && loads[index] < OVERLOAD_THRESHOLD
                    && can_place(workload, &hosts[index])
            });

            let Some(destination) = destination else {
                debug!(
                    workload = %workload_id,
                    host = %hosts[source].id,
                    "No suitable destination, workload left in place"
                );
                report.skipped += 1;
                continue;
            };

            migrate(hosts, &workload_id, source, destination);
            loads[source] = hosts[source].load();
            loads[destination] = hosts[destination].load();

            info!(
                workload = %workload_id,
                source = %hosts[source].id,
                destination = %hosts[destination].id,
                "Workload migrated"
            );
            report.migrations.push(Migration {
                workload_id,
                source: hosts[source].id.clone(),
                destination: hosts[destination].id.clone(),
            });

            if loads[source] < OVERLOAD_THRESHOLD {
                break;
            }
        }
    }

    report
}

/// Move a workload and point its GPU requirement at the destination's first GPU.
///
/// The new requirement is not checked against the old one, so a workload can
/// end up describing a weaker GPU than it originally asked for.
fn migrate(hosts: &mut [Host], workload_id: &str, source: usize, destination: usize) {
    if let Some(mut workload) = hosts[source].remove_workload(workload_id) {
        if let Some(gpu) = hosts[destination].gpus.first() {
            workload.gpu = gpu.clone();
        }
        hosts[destination].add_workload(workload);
    }
}

//! Admission predicate shared by every placement strategy and the rebalancer

use crate::model::{Host, Workload};

/// Whether `host` has enough unrequested CPU and memory for `workload`.
///
/// Requests are in millicores while capacity is in whole cores.
pub fn has_compute_headroom(workload: &Workload, host: &Host) -> bool {
    host.free_cpu_millicores() >= workload.cpu_millicores as i64
        && host.free_memory_mb() >= workload.memory_mb as i64
}

/// Whether `workload` can be placed on `host`.
///
/// Checks, in order: free CPU, free memory, and that at least one attached GPU
/// meets the workload's GPU requirement on CUDA cores, VRAM and bandwidth.
/// A host without GPUs never admits a workload.
pub fn can_place(workload: &Workload, host: &Host) -> bool {
    has_compute_headroom(workload, host) && host.gpus.iter().any(|g| g.satisfies(&workload.gpu))
}

//! Reserved GPU capacity, keyed by GPU identity

use fleetsim_core::Gpu;
use std::collections::HashMap;
use tracing::debug;

/// A slice of GPU capacity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuShare {
    pub cuda_cores: u64,
    pub vram_mb: u64,
    pub memory_bandwidth_gbps: u64,
    pub power_watts: u64,
}

impl GpuShare {
    /// The full capacity of `gpu`
    pub fn of(gpu: &Gpu) -> Self {
        Self {
            cuda_cores: gpu.cuda_cores as u64,
            vram_mb: gpu.vram_mb,
            memory_bandwidth_gbps: gpu.memory_bandwidth_gbps as u64,
            power_watts: gpu.power_watts as u64,
        }
    }

    /// Whether this share is at least `other` on every field
    pub fn covers(&self, other: &GpuShare) -> bool {
        self.cuda_cores >= other.cuda_cores
            && self.vram_mb >= other.vram_mb
            && self.memory_bandwidth_gbps >= other.memory_bandwidth_gbps
            && self.power_watts >= other.power_watts
    }

    fn saturating_sub(self, other: GpuShare) -> Self {
        Self {
            cuda_cores: self.cuda_cores.saturating_sub(other.cuda_cores),
            vram_mb: self.vram_mb.saturating_sub(other.vram_mb),
            memory_bandwidth_gbps: self
                .memory_bandwidth_gbps
                .saturating_sub(other.memory_bandwidth_gbps),
            power_watts: self.power_watts.saturating_sub(other.power_watts),
        }
    }

    fn add(self, other: GpuShare) -> Self {
        Self {
            cuda_cores: self.cuda_cores + other.cuda_cores,
            vram_mb: self.vram_mb + other.vram_mb,
            memory_bandwidth_gbps: self.memory_bandwidth_gbps + other.memory_bandwidth_gbps,
            power_watts: self.power_watts + other.power_watts,
        }
    }
}

/// Ledger of capacity reserved on each GPU.
///
/// GPU capability records are never mutated; remaining capacity is derived
/// as capability minus reservations.
#[derive(Debug, Default, Clone)]
pub struct ReservationLedger {
    /// Reserved capacity indexed by GPU id
    reserved: HashMap<String, GpuShare>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity reserved on a GPU so far
    pub fn reserved(&self, gpu_id: &str) -> GpuShare {
        self.reserved.get(gpu_id).copied().unwrap_or_default()
    }

    /// Capacity of `gpu` not yet reserved
    pub fn remaining(&self, gpu: &Gpu) -> GpuShare {
        GpuShare::of(gpu).saturating_sub(self.reserved(&gpu.id))
    }

    /// Record that `workload_id` reserved `share` on `gpu_id`
    pub fn reserve(&mut self, gpu_id: &str, workload_id: &str, share: GpuShare) {
        let total = self.reserved(gpu_id).add(share);
        self.reserved.insert(gpu_id.to_string(), total);

        debug!(
            gpu = gpu_id,
            workload = workload_id,
            cuda_cores = share.cuda_cores,
            "Reserved GPU capacity"
        );
    }
}

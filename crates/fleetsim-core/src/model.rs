//! Host and Workload type definitions

use serde::{Deserialize, Serialize};

use crate::gpu::Gpu;

/// Millicores per whole CPU core
pub const MILLICORES_PER_CORE: f64 = 1000.0;

/// Ratio of `used` to `total`, treating a zero denominator as no usage
pub(crate) fn ratio(used: f64, total: f64) -> f64 {
    if total > 0.0 {
        used / total
    } else {
        0.0
    }
}

/// A schedulable unit with CPU, memory and GPU requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    /// Unique workload identifier
    pub id: String,
    /// Requested CPU in millicores
    pub cpu_millicores: u32,
    /// Requested memory in MB
    pub memory_mb: u64,
    /// GPU capability the workload requires.
    ///
    /// Describes a requirement only; it is not necessarily the device the
    /// workload runs on.
    pub gpu: Gpu,
    /// Scheduling priority, higher is more urgent
    pub priority: i32,
}

impl Workload {
    /// Create a new workload
    pub fn new(
        id: impl Into<String>,
        cpu_millicores: u32,
        memory_mb: u64,
        gpu: Gpu,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            cpu_millicores,
            memory_mb,
            gpu,
            priority,
        }
    }

    /// Requested CPU expressed in whole cores
    pub fn cpu_cores(&self) -> f64 {
        self.cpu_millicores as f64 / MILLICORES_PER_CORE
    }
}

/// A machine with fixed CPU and memory capacity and zero or more GPUs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Unique host identifier
    pub id: String,
    /// Number of CPU cores
    pub cpu_cores: u32,
    /// Memory in MB
    pub memory_mb: u64,
    /// GPUs physically attached to this host
    pub gpus: Vec<Gpu>,
    /// Workloads currently placed on this host
    pub workloads: Vec<Workload>,
}

impl Host {
    /// Create a new host with no GPUs and no workloads
    pub fn new(id: impl Into<String>, cpu_cores: u32, memory_mb: u64) -> Self {
        Self {
            id: id.into(),
            cpu_cores,
            memory_mb,
            gpus: Vec::new(),
            workloads: Vec::new(),
        }
    }

    /// Builder-style GPU attachment
    pub fn with_gpu(mut self, gpu: Gpu) -> Self {
        self.gpus.push(gpu);
        self
    }

    pub fn add_gpu(&mut self, gpu: Gpu) {
        self.gpus.push(gpu);
    }

    pub fn add_workload(&mut self, workload: Workload) {
        self.workloads.push(workload);
    }

    /// Remove a workload by id, returning it if it was placed here
    pub fn remove_workload(&mut self, workload_id: &str) -> Option<Workload> {
        let index = self.workloads.iter().position(|w| w.id == workload_id)?;
        Some(self.workloads.remove(index))
    }

    pub fn has_workload(&self, workload_id: &str) -> bool {
        self.workloads.iter().any(|w| w.id == workload_id)
    }

    /// CPU requested by placed workloads, in millicores
    pub fn used_cpu_millicores(&self) -> u64 {
        self.workloads.iter().map(|w| w.cpu_millicores as u64).sum()
    }

    /// CPU requested by placed workloads, in cores
    pub fn used_cpu_cores(&self) -> f64 {
        self.used_cpu_millicores() as f64 / MILLICORES_PER_CORE
    }

    /// Memory requested by placed workloads, in MB
    pub fn used_memory_mb(&self) -> u64 {
        self.workloads.iter().map(|w| w.memory_mb).sum()
    }

    /// Unrequested CPU in millicores; negative when drift has overcommitted the host
    pub fn free_cpu_millicores(&self) -> i64 {
        self.cpu_cores as i64 * MILLICORES_PER_CORE as i64 - self.used_cpu_millicores() as i64
    }

    /// Unrequested memory in MB; negative when drift has overcommitted the host
    pub fn free_memory_mb(&self) -> i64 {
        self.memory_mb as i64 - self.used_memory_mb() as i64
    }

    /// Requested CPU as a fraction of capacity (0 for a zero-core host)
    pub fn cpu_fraction(&self) -> f64 {
        ratio(self.used_cpu_cores(), self.cpu_cores as f64)
    }

    /// Requested memory as a fraction of capacity (0 for a zero-memory host)
    pub fn memory_fraction(&self) -> f64 {
        ratio(self.used_memory_mb() as f64, self.memory_mb as f64)
    }

    /// Required CUDA cores of placed workloads as a fraction of attached CUDA cores
    pub fn gpu_fraction(&self) -> f64 {
        let required: u64 = self.workloads.iter().map(|w| w.gpu.cuda_cores as u64).sum();
        let attached: u64 = self.gpus.iter().map(|g| g.cuda_cores as u64).sum();
        ratio(required as f64, attached as f64)
    }

    /// Load score used by rebalancing: the higher of CPU and memory fraction.
    ///
    /// GPU and I/O are not part of the score.
    pub fn load(&self) -> f64 {
        self.cpu_fraction().max(self.memory_fraction())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gpu() -> Gpu {
        Gpu::new("gpu-a", 4000, 0, 8192, 900, 10.0, 250)
    }

    #[test]
    fn test_workload_cpu_cores() {
        let w = Workload::new("w", 2500, 512, test_gpu(), 0);
        assert!((w.cpu_cores() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_and_remove_workload() {
        let mut host = Host::new("host-a", 4, 8192);
        host.add_workload(Workload::new("w1", 1000, 512, test_gpu(), 0));
        host.add_workload(Workload::new("w2", 1000, 512, test_gpu(), 0));

        assert!(host.has_workload("w1"));
        let removed = host.remove_workload("w1").unwrap();
        assert_eq!(removed.id, "w1");
        assert!(!host.has_workload("w1"));
        assert!(host.remove_workload("missing").is_none());
        assert_eq!(host.workloads.len(), 1);
    }

    #[test]
    fn test_load_is_max_of_cpu_and_memory() {
        let mut host = Host::new("host-a", 4, 8192).with_gpu(test_gpu());
        host.add_workload(Workload::new("w1", 2000, 6144, test_gpu(), 0));

        assert!((host.cpu_fraction() - 0.5).abs() < 1e-9);
        assert!((host.memory_fraction() - 0.75).abs() < 1e-9);
        assert!((host.load() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_overcommitted_host() {
        let mut host = Host::new("host-a", 4, 8192);
        host.add_workload(Workload::new("w1", 2000, 1024, test_gpu(), 0));
        host.add_workload(Workload::new("w2", 2500, 1024, test_gpu(), 0));

        assert!((host.load() - 1.125).abs() < 1e-9);
        assert_eq!(host.free_cpu_millicores(), -500);
    }

    #[test]
    fn test_zero_capacity_host_has_zero_fractions() {
        let mut host = Host::new("empty", 0, 0);
        host.add_workload(Workload::new("w1", 500, 128, test_gpu(), 0));

        assert_eq!(host.cpu_fraction(), 0.0);
        assert_eq!(host.memory_fraction(), 0.0);
        assert_eq!(host.gpu_fraction(), 0.0);
        assert_eq!(host.load(), 0.0);
    }

    #[test]
    fn test_gpu_fraction() {
        let mut host = Host::new("host-a", 8, 8192).with_gpu(test_gpu());
        let mut small = test_gpu();
        small.cuda_cores = 1000;
        host.add_workload(Workload::new("w1", 100, 64, small, 0));

        assert!((host.gpu_fraction() - 0.25).abs() < 1e-9);
    }
}

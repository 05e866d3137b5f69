//! GPU capability description

use serde::{Deserialize, Serialize};

/// Capability of a single GPU.
///
/// The same type describes a physical device attached to a host and the
/// capability a workload requires. Remaining capacity is never tracked here;
/// see the reservation ledger in `fleetsim-scheduler` for that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gpu {
    /// Device identifier, unique across the fleet
    pub id: String,
    /// Number of CUDA cores
    pub cuda_cores: u32,
    /// Number of tensor cores
    pub tensor_cores: u32,
    /// Video memory in MB
    pub vram_mb: u64,
    /// Memory bandwidth in GB/s
    pub memory_bandwidth_gbps: u32,
    /// Compute throughput in TFLOPS
    pub tflops: f64,
    /// Power draw in watts
    pub power_watts: u32,
}

impl Gpu {
    /// Create a new GPU description
    pub fn new(
        id: impl Into<String>,
        cuda_cores: u32,
        tensor_cores: u32,
        vram_mb: u64,
        memory_bandwidth_gbps: u32,
        tflops: f64,
        power_watts: u32,
    ) -> Self {
        Self {
            id: id.into(),
            cuda_cores,
            tensor_cores,
            vram_mb,
            memory_bandwidth_gbps,
            tflops,
            power_watts,
        }
    }

    /// Whether this GPU meets `required` on CUDA cores, VRAM and bandwidth.
    ///
    /// Power draw is deliberately not part of this comparison.
    pub fn satisfies(&self, required: &Gpu) -> bool {
        self.cuda_cores >= required.cuda_cores
            && self.vram_mb >= required.vram_mb
            && self.memory_bandwidth_gbps >= required.memory_bandwidth_gbps
    }
}

impl std::fmt::Display for Gpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} CUDA, {} MB, {} GB/s)",
            self.id, self.cuda_cores, self.vram_mb, self.memory_bandwidth_gbps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpu(cuda: u32, vram: u64, bw: u32, power: u32) -> Gpu {
        Gpu::new("gpu", cuda, 0, vram, bw, 1.0, power)
    }

    #[test]
    fn test_satisfies_componentwise() {
        let host_gpu = gpu(4000, 8192, 900, 250);

        assert!(host_gpu.satisfies(&gpu(4000, 8192, 900, 250)));
        assert!(host_gpu.satisfies(&gpu(1000, 1024, 100, 0)));
        assert!(!host_gpu.satisfies(&gpu(4001, 1024, 100, 0)));
        assert!(!host_gpu.satisfies(&gpu(1000, 8193, 100, 0)));
        assert!(!host_gpu.satisfies(&gpu(1000, 1024, 901, 0)));
    }

    #[test]
    fn test_satisfies_ignores_power() {
        let host_gpu = gpu(4000, 8192, 900, 100);
        assert!(host_gpu.satisfies(&gpu(4000, 8192, 900, 400)));
    }

    #[test]
    fn test_gpu_display() {
        let g = Gpu::new("gpu-1", 3584, 224, 8192, 900, 13.4, 250);
        assert_eq!(g.to_string(), "gpu-1 (3584 CUDA, 8192 MB, 900 GB/s)");
    }
}

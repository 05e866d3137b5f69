//! Scenario configuration for fleetsim

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::gpu::Gpu;
use crate::model::{Host, Workload};
use crate::{FleetsimError, FleetsimResult};

/// Complete simulation scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetsimConfig {
    /// Simulation timing and strategy
    pub simulation: SimulationSettings,
    /// QoS thresholds
    pub qos: QosThresholds,
    /// Workload drift settings
    pub drift: DriftSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Hosts and their attached GPUs
    pub hosts: Vec<HostConfig>,
    /// Initial workload batch
    pub workloads: Vec<WorkloadConfig>,
}

impl Default for FleetsimConfig {
    fn default() -> Self {
        let gpu1 = GpuConfig {
            id: "gpu-1".to_string(),
            cuda_cores: 3584,
            tensor_cores: 224,
            vram_mb: 8192,
            memory_bandwidth_gbps: 900,
            tflops: 13.4,
            power_watts: 250,
        };
        let gpu2 = GpuConfig {
            id: "gpu-2".to_string(),
            cuda_cores: 4352,
            tensor_cores: 272,
            vram_mb: 16384,
            memory_bandwidth_gbps: 1200,
            tflops: 18.6,
            power_watts: 300,
        };

        Self {
            simulation: SimulationSettings::default(),
            qos: QosThresholds::default(),
            drift: DriftSettings::default(),
            logging: LoggingConfig::default(),
            hosts: vec![
                HostConfig {
                    id: "host-1".to_string(),
                    cpu_cores: 16,
                    memory_mb: 32768,
                    gpus: vec![gpu1],
                },
                HostConfig {
                    id: "host-2".to_string(),
                    cpu_cores: 32,
                    memory_mb: 65536,
                    gpus: vec![gpu2],
                },
            ],
            workloads: vec![
                WorkloadConfig::new("container-1", 2000, 2048, "gpu-1", 1),
                WorkloadConfig::new("container-2", 1500, 1024, "gpu-1", 2),
                WorkloadConfig::new("container-3", 1000, 512, "gpu-2", 3),
            ],
        }
    }
}

impl FleetsimConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> FleetsimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> FleetsimResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the host list and the workload batch.
    ///
    /// A workload's GPU requirement is a copy of the capability of the GPU it
    /// names, which may be attached to any host.
    pub fn build_fleet(&self) -> FleetsimResult<(Vec<Host>, Vec<Workload>)> {
        let mut catalog: HashMap<&str, Gpu> = HashMap::new();
        let mut hosts = Vec::with_capacity(self.hosts.len());

        for host_config in &self.hosts {
            let mut host = Host::new(
                host_config.id.clone(),
                host_config.cpu_cores,
                host_config.memory_mb,
            );
            for gpu_config in &host_config.gpus {
                let gpu = gpu_config.to_gpu();
                catalog.insert(gpu_config.id.as_str(), gpu.clone());
                host.add_gpu(gpu);
            }
            hosts.push(host);
        }

        let workloads = self
            .workloads
            .iter()
            .map(|w| {
                let gpu = catalog.get(w.gpu.as_str()).cloned().ok_or_else(|| {
                    FleetsimError::Config(format!(
                        "Workload {} references unknown GPU {}",
                        w.id, w.gpu
                    ))
                })?;
                Ok(Workload::new(
                    w.id.clone(),
                    w.cpu_millicores,
                    w.memory_mb,
                    gpu,
                    w.priority,
                ))
            })
            .collect::<FleetsimResult<Vec<_>>>()?;

        Ok((hosts, workloads))
    }
}

/// Simulation timing and strategy selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Total simulated run time in seconds
    pub duration_secs: u64,
    /// Utilization sampling interval in milliseconds
    pub sample_interval_ms: u64,
    /// QoS evaluation interval in milliseconds
    pub evaluation_interval_ms: u64,
    /// Maximum number of samples kept in the metrics history
    pub history_capacity: usize,
    /// Placement strategy for the initial batch
    pub strategy: StrategyKind,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            duration_secs: 300,
            sample_interval_ms: 10_000,
            evaluation_interval_ms: 1_000,
            history_capacity: 1024,
            strategy: StrategyKind::Priority,
        }
    }
}

/// Placement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Highest priority first, first fit
    Priority,
    /// Largest CPU request first, first fit
    BinPacking,
    /// Rotating cursor over hosts
    RoundRobin,
    /// Proportional share of fleet CUDA cores
    ProportionalFairness,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Priority => write!(f, "priority"),
            StrategyKind::BinPacking => write!(f, "bin-packing"),
            StrategyKind::RoundRobin => write!(f, "round-robin"),
            StrategyKind::ProportionalFairness => write!(f, "proportional-fairness"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = FleetsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "priority" => Ok(StrategyKind::Priority),
            "bin-packing" | "binpacking" => Ok(StrategyKind::BinPacking),
            "round-robin" | "roundrobin" => Ok(StrategyKind::RoundRobin),
            "proportional-fairness" | "fairness" => Ok(StrategyKind::ProportionalFairness),
            other => Err(FleetsimError::Config(format!("Unknown strategy: {}", other))),
        }
    }
}

/// QoS thresholds in percent; a metric strictly above its threshold is a violation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QosThresholds {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub gpu_percent: f64,
    pub io_percent: f64,
}

impl Default for QosThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 85.0,
            gpu_percent: 95.0,
            io_percent: 75.0,
        }
    }
}

/// Workload drift settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftSettings {
    /// Whether the drift actor runs alongside the orchestrator
    pub enabled: bool,
    /// Interval between perturbations in milliseconds
    pub interval_ms: u64,
    /// Maximum relative change of a request, in percent
    pub max_change_percent: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 5_000,
            max_change_percent: 20.0,
            seed: 42,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log file path (if any); stderr otherwise
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Host entry in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub id: String,
    pub cpu_cores: u32,
    pub memory_mb: u64,
    #[serde(default)]
    pub gpus: Vec<GpuConfig>,
}

/// GPU entry in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuConfig {
    pub id: String,
    pub cuda_cores: u32,
    #[serde(default)]
    pub tensor_cores: u32,
    pub vram_mb: u64,
    pub memory_bandwidth_gbps: u32,
    #[serde(default)]
    pub tflops: f64,
    #[serde(default)]
    pub power_watts: u32,
}

impl GpuConfig {
    fn to_gpu(&self) -> Gpu {
        Gpu::new(
            self.id.clone(),
            self.cuda_cores,
            self.tensor_cores,
            self.vram_mb,
            self.memory_bandwidth_gbps,
            self.tflops,
            self.power_watts,
        )
    }
}

/// Workload entry in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub id: String,
    pub cpu_millicores: u32,
    pub memory_mb: u64,
    /// Id of the GPU whose capability this workload requires
    pub gpu: String,
    #[serde(default)]
    pub priority: i32,
}

impl WorkloadConfig {
    fn new(id: &str, cpu_millicores: u32, memory_mb: u64, gpu: &str, priority: i32) -> Self {
        Self {
            id: id.to_string(),
            cpu_millicores,
            memory_mb,
            gpu: gpu.to_string(),
            priority,
        }
    }
}

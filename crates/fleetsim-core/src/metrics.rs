//! Fleet-wide utilization snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Host;

/// Value reported for I/O usage.
///
/// The simulation has no I/O telemetry; this is a fixed placeholder and not a
/// measured metric.
pub const IO_USAGE_PLACEHOLDER: f64 = 0.0;

/// Kind of utilization metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Cpu,
    Memory,
    Gpu,
    Io,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::Cpu => write!(f, "CPU"),
            MetricKind::Memory => write!(f, "Memory"),
            MetricKind::Gpu => write!(f, "GPU"),
            MetricKind::Io => write!(f, "IO"),
        }
    }
}

/// Fleet-wide averaged utilization percentages at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSnapshot {
    /// Average CPU usage (%)
    pub cpu: f64,
    /// Average memory usage (%)
    pub memory: f64,
    /// Average GPU usage (%)
    pub gpu: f64,
    /// I/O usage (%), always [`IO_USAGE_PLACEHOLDER`] when computed from hosts
    pub io: f64,
}

impl UtilizationSnapshot {
    pub fn new(cpu: f64, memory: f64, gpu: f64, io: f64) -> Self {
        Self {
            cpu,
            memory,
            gpu,
            io,
        }
    }

    /// Average the per-host usage ratios across `hosts`.
    ///
    /// An empty fleet yields the all-zero snapshot.
    pub fn from_hosts(hosts: &[Host]) -> Self {
        if hosts.is_empty() {
            return Self::default();
        }

        let count = hosts.len() as f64;
        let (cpu, memory, gpu) = hosts.iter().fold((0.0, 0.0, 0.0), |(c, m, g), host| {
            (
                c + host.cpu_fraction(),
                m + host.memory_fraction(),
                g + host.gpu_fraction(),
            )
        });

        Self {
            cpu: cpu / count * 100.0,
            memory: memory / count * 100.0,
            gpu: gpu / count * 100.0,
            io: IO_USAGE_PLACEHOLDER,
        }
    }

    /// Value of a single metric
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Cpu => self.cpu,
            MetricKind::Memory => self.memory,
            MetricKind::Gpu => self.gpu,
            MetricKind::Io => self.io,
        }
    }
}

/// A snapshot together with the time it was taken
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSample {
    pub recorded_at: DateTime<Utc>,
    pub snapshot: UtilizationSnapshot,
}

impl UtilizationSample {
    /// Stamp a snapshot with the current time
    pub fn now(snapshot: UtilizationSnapshot) -> Self {
        Self {
            recorded_at: Utc::now(),
            snapshot,
        }
    }
}

//! QoS threshold evaluation

use fleetsim_core::{MetricKind, QosThresholds, UtilizationSnapshot};
use serde::Serialize;

/// A metric that exceeded its threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QosViolation {
    pub kind: MetricKind,
    pub observed: f64,
    pub threshold: f64,
}

/// Outcome of evaluating one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QosReport {
    pub violations: Vec<QosViolation>,
}

impl QosReport {
    /// True when no metric exceeded its threshold
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violated metric kinds, in CPU, memory, GPU, I/O order
    pub fn kinds(&self) -> Vec<MetricKind> {
        self.violations.iter().map(|v| v.kind).collect()
    }
}

/// Compares snapshots against fixed thresholds. Stateless.
#[derive(Debug, Clone, Copy)]
pub struct QosEvaluator {
    thresholds: QosThresholds,
}

impl QosEvaluator {
    pub fn new(thresholds: QosThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QosThresholds {
        &self.thresholds
    }

    pub fn threshold(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Cpu => self.thresholds.cpu_percent,
            MetricKind::Memory => self.thresholds.memory_percent,
            MetricKind::Gpu => self.thresholds.gpu_percent,
            MetricKind::Io => self.thresholds.io_percent,
        }
    }

    /// A metric is violated when it strictly exceeds its threshold
    pub fn evaluate(&self, snapshot: &UtilizationSnapshot) -> QosReport {
        let violations = [
            MetricKind::Cpu,
            MetricKind::Memory,
            MetricKind::Gpu,
            MetricKind::Io,
        ]
        .into_iter()
        .filter_map(|kind| {
            let observed = snapshot.get(kind);
            let threshold = self.threshold(kind);
            (observed > threshold).then_some(QosViolation {
                kind,
                observed,
                threshold,
            })
        })
        .collect();

        QosReport { violations }
    }
}

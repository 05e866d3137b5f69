//! Rebalancing orchestrator
//!
//! Runs two independently paced loops against one shared fleet: a sampling
//! loop that records utilization snapshots, and a faster evaluation loop that
//! checks the latest snapshot against QoS thresholds and triggers a
//! rebalancing pass on violation. Both loops stop at the simulation deadline.

use fleetsim_core::{
    FleetsimError, FleetsimResult, MetricKind, SimulationSettings, UtilizationSnapshot, Workload,
};
use fleetsim_scheduler::FleetRegistry;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::history::MetricsHistory;
use crate::qos::{QosEvaluator, QosReport};
use crate::rebalance::{rebalance, RebalanceReport};

/// Loop timing and history size
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interval between utilization samples
    pub sample_interval: Duration,
    /// Interval between QoS evaluations
    pub evaluation_interval: Duration,
    /// Maximum retained samples
    pub history_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(10),
            evaluation_interval: Duration::from_secs(1),
            history_capacity: 1024,
        }
    }
}

impl From<&SimulationSettings> for OrchestratorConfig {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            sample_interval: Duration::from_millis(settings.sample_interval_ms),
            evaluation_interval: Duration::from_millis(settings.evaluation_interval_ms),
            history_capacity: settings.history_capacity,
        }
    }
}

#[derive(Debug, Default)]
struct RunCounters {
    samples: AtomicUsize,
    evaluations: AtomicUsize,
    violations: AtomicUsize,
    rebalances: AtomicUsize,
    migrations: AtomicUsize,
}

/// Totals for a run, plus the final QoS verdict
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub samples: usize,
    pub evaluations: usize,
    /// Evaluations that found at least one violated metric
    pub violations: usize,
    pub rebalances: usize,
    pub migrations: usize,
    pub final_utilization: UtilizationSnapshot,
    pub qos_met: bool,
    pub final_violations: Vec<MetricKind>,
}

/// Drives initial placement and the monitoring loops.
///
/// Cloning is cheap; clones share the fleet, the history and the counters.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<FleetRegistry>,
    history: Arc<MetricsHistory>,
    qos: QosEvaluator,
    config: OrchestratorConfig,
    counters: Arc<RunCounters>,
}

impl Orchestrator {
    pub fn new(registry: Arc<FleetRegistry>, qos: QosEvaluator, config: OrchestratorConfig) -> Self {
        let thresholds = qos.thresholds();
        info!(
            sample_interval_ms = config.sample_interval.as_millis() as u64,
            evaluation_interval_ms = config.evaluation_interval.as_millis() as u64,
            cpu_threshold = thresholds.cpu_percent,
            memory_threshold = thresholds.memory_percent,
            gpu_threshold = thresholds.gpu_percent,
            io_threshold = thresholds.io_percent,
            "Orchestrator initialized"
        );

        Self {
            history: Arc::new(MetricsHistory::new(config.history_capacity)),
            registry,
            qos,
            config,
            counters: Arc::new(RunCounters::default()),
        }
    }

    pub fn registry(&self) -> &Arc<FleetRegistry> {
        &self.registry
    }

    /// Place `workloads`, then run both loops until `duration` has elapsed.
    ///
    /// A placement failure is fatal: the loops are not started and the
    /// error is returned.
    pub async fn run(&self, workloads: Vec<Workload>, duration: Duration) -> FleetsimResult<RunSummary> {
        info!(
            workloads = workloads.len(),
            duration_secs = duration.as_secs(),
            "Starting orchestrator run"
        );

        if let Err(e) = self.registry.allocate_resources(workloads).await {
            error!(error = %e, "Initial placement failed");
            return Err(e);
        }

        let deadline = Instant::now() + duration;

        let sampler = {
            let this = self.clone();
            tokio::spawn(async move { this.sample_loop(deadline).await })
        };
        let evaluator = {
            let this = self.clone();
            tokio::spawn(async move { this.evaluation_loop(deadline).await })
        };

        let (sampled, evaluated) = tokio::join!(sampler, evaluator);
        sampled.map_err(|e| FleetsimError::Internal(format!("Sampling loop failed: {}", e)))?;
        evaluated.map_err(|e| FleetsimError::Internal(format!("Evaluation loop failed: {}", e)))?;

        info!("Orchestrator run completed");

        let summary = self.summary().await;
        info!(
            cpu = summary.final_utilization.cpu,
            memory = summary.final_utilization.memory,
            gpu = summary.final_utilization.gpu,
            io = summary.final_utilization.io,
            "Final metrics"
        );
        if summary.qos_met {
            info!("QoS requirements met");
        } else {
            warn!(violations = ?summary.final_violations, "QoS requirements not met");
        }

        Ok(summary)
    }

    async fn sample_loop(&self, deadline: Instant) {
        info!("Starting metrics collection");
        let period = self.config.sample_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = sleep_until(deadline);
        tokio::pin!(stop);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    self.sample().await;
                }
            }
        }
    }

    async fn evaluation_loop(&self, deadline: Instant) {
        info!("Starting QoS monitoring");
        let period = self.config.evaluation_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = sleep_until(deadline);
        tokio::pin!(stop);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    self.evaluate().await;
                }
            }
        }
    }

    /// Take one utilization sample and append it to the history
    pub async fn sample(&self) -> UtilizationSnapshot {
        let snapshot = self.registry.current_utilization().await;
        self.history.record(snapshot).await;
        self.counters.samples.fetch_add(1, Ordering::Relaxed);

        info!(
            cpu = snapshot.cpu,
            memory = snapshot.memory,
            gpu = snapshot.gpu,
            io = snapshot.io,
            "Sample recorded"
        );
        snapshot
    }

    /// Evaluate the latest sample and rebalance if QoS is violated
    pub async fn evaluate(&self) -> QosReport {
        let snapshot = self.history.latest().await;
        let report = self.qos.evaluate(&snapshot);
        self.counters.evaluations.fetch_add(1, Ordering::Relaxed);

        if !report.passed() {
            self.counters.violations.fetch_add(1, Ordering::Relaxed);
            for violation in &report.violations {
                warn!(
                    metric = %violation.kind,
                    observed = violation.observed,
                    threshold = violation.threshold,
                    "QoS threshold exceeded"
                );
            }
            warn!(violations = ?report.kinds(), "QoS violation detected");
            self.trigger_reallocation().await;
        }

        report
    }

    /// Run one rebalancing pass now.
    ///
    /// Also the entry point for external callers such as the drift actor.
    /// The pass holds the fleet lock until it completes.
    pub async fn trigger_reallocation(&self) -> RebalanceReport {
        info!("Triggering reallocation");
        let report = self.registry.with_hosts_mut(rebalance).await;

        self.counters.rebalances.fetch_add(1, Ordering::Relaxed);
        self.counters
            .migrations
            .fetch_add(report.migrations.len(), Ordering::Relaxed);

        info!(
            migrations = report.migrations.len(),
            skipped = report.skipped,
            "Reallocation finished"
        );
        report
    }

    /// Counters so far and the verdict on the latest sample
    pub async fn summary(&self) -> RunSummary {
        let final_utilization = self.history.latest().await;
        let final_qos = self.qos.evaluate(&final_utilization);

        RunSummary {
            samples: self.counters.samples.load(Ordering::Relaxed),
            evaluations: self.counters.evaluations.load(Ordering::Relaxed),
            violations: self.counters.violations.load(Ordering::Relaxed),
            rebalances: self.counters.rebalances.load(Ordering::Relaxed),
            migrations: self.counters.migrations.load(Ordering::Relaxed),
            final_utilization,
            qos_met: final_qos.passed(),
            final_violations: final_qos.kinds(),
        }
    }
}

//! fleetsim-orchestrator: QoS monitoring and rebalancing
//!
//! This crate keeps a placed fleet within its QoS targets:
//! - Bounded history of utilization samples
//! - Threshold evaluation of snapshots
//! - Greedy rebalancing of overloaded hosts
//! - The orchestrator that paces sampling and evaluation
//! - Optional request drift to exercise rebalancing

pub mod drift;
pub mod history;
pub mod orchestrator;
pub mod qos;
pub mod rebalance;

pub use drift::{DriftEvent, WorkloadDrift};
pub use history::MetricsHistory;
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunSummary};
pub use qos::{QosEvaluator, QosReport, QosViolation};
pub use rebalance::{rebalance, Migration, RebalanceReport, OVERLOAD_THRESHOLD};

//! fleetsim-core: Core types for the fleetsim GPU fleet simulator
//!
//! This crate provides the fundamental types used throughout fleetsim:
//! - GPU, host and workload capacity model
//! - The admission predicate shared by schedulers and the rebalancer
//! - Utilization snapshots
//! - Scenario configuration
//! - Error handling

pub mod admission;
pub mod config;
pub mod error;
pub mod gpu;
pub mod metrics;
pub mod model;

pub use admission::*;
pub use config::*;
pub use error::*;
pub use gpu::*;
pub use metrics::*;
pub use model::*;

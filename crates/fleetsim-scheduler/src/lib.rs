//! fleetsim-scheduler: Placement strategies and the fleet registry
//!
//! This crate decides where workloads run:
//! - The `PlacementStrategy` contract and its implementations
//!   (priority, bin packing, round robin, proportional fairness)
//! - GPU capacity reservations for proportional fairness
//! - The fleet registry that owns hosts and the active strategy

pub mod bin_packing;
pub mod fairness;
pub mod placement;
pub mod priority;
pub mod registry;
pub mod reservation;
pub mod round_robin;

pub use bin_packing::BinPackingStrategy;
pub use fairness::ProportionalFairnessStrategy;
pub use placement::{build_strategy, PlacementStrategy};
pub use priority::PriorityStrategy;
pub use registry::FleetRegistry;
pub use reservation::{GpuShare, ReservationLedger};
pub use round_robin::RoundRobinStrategy;

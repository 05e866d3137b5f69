//! Largest-first bin packing

use fleetsim_core::{FleetsimResult, Host, Workload};

use crate::placement::{place_first_fit, PlacementStrategy};

/// Places workloads in descending CPU request order, each on the first host
/// that admits it. Packing the largest requests first leaves less
/// fragmentation than arrival order.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinPackingStrategy;

impl PlacementStrategy for BinPackingStrategy {
    fn name(&self) -> &'static str {
        "bin-packing"
    }

    fn schedule(&mut self, mut workloads: Vec<Workload>, hosts: &mut [Host]) -> FleetsimResult<()> {
        workloads.sort_by(|a, b| b.cpu_millicores.cmp(&a.cpu_millicores));
        place_first_fit(workloads, hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::test_support::*;
    use crate::priority::PriorityStrategy;

    #[test]
    fn test_largest_first_avoids_fragmentation() {
        // Arrival order strands the second 3-core workload; largest-first does not
        let batch = || {
            vec![
                workload("small-1", 1000, 0),
                workload("small-2", 1000, 0),
                workload("large-1", 3000, 0),
                workload("large-2", 3000, 0),
            ]
        };

        let mut arrival_hosts = vec![host("a", 4), host("b", 4)];
        let err = PriorityStrategy
            .schedule(batch(), &mut arrival_hosts)
            .unwrap_err();
        assert_eq!(err.workload_id(), Some("large-2"));

        let mut packed_hosts = vec![host("a", 4), host("b", 4)];
        BinPackingStrategy.schedule(batch(), &mut packed_hosts).unwrap();
        assert!(packed_hosts[0].has_workload("large-1"));
        assert!(packed_hosts[0].has_workload("small-1"));
        assert!(packed_hosts[1].has_workload("large-2"));
        assert!(packed_hosts[1].has_workload("small-2"));
    }

    #[test]
    fn test_equal_requests_keep_arrival_order() {
        let mut hosts = vec![host("a", 8)];
        let workloads = vec![workload("x", 500, 0), workload("y", 500, 0)];

        BinPackingStrategy.schedule(workloads, &mut hosts).unwrap();
        assert_eq!(hosts[0].workloads[0].id, "x");
        assert_eq!(hosts[0].workloads[1].id, "y");
    }

    #[test]
    fn test_failure_names_workload() {
        let mut hosts = vec![host("a", 2)];
        let err = BinPackingStrategy
            .schedule(vec![workload("huge", 3000, 0)], &mut hosts)
            .unwrap_err();
        assert_eq!(err.workload_id(), Some("huge"));
    }
}

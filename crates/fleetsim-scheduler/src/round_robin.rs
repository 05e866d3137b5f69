//! Round-robin placement

use fleetsim_core::{can_place, FleetsimResult, Host, Workload};

use crate::placement::{place, unschedulable, PlacementStrategy};

/// Spreads workloads over hosts with a cursor that persists across calls.
///
/// Each workload scans hosts starting at the cursor and wraps around once.
/// On success the cursor moves just past the chosen host. The cursor belongs
/// to this instance, so independent fleets keep independent progress.
#[derive(Debug, Default, Clone)]
pub struct RoundRobinStrategy {
    cursor: usize,
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the host the next scan starts at
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl PlacementStrategy for RoundRobinStrategy {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn schedule(&mut self, workloads: Vec<Workload>, hosts: &mut [Host]) -> FleetsimResult<()> {
        let count = hosts.len();

        for workload in workloads {
            // The fleet may have shrunk since the last call
            let start = if count == 0 { 0 } else { self.cursor % count };
            let chosen = (0..count)
                .map(|offset| (start + offset) % count)
                .find(|&index| can_place(&workload, &hosts[index]));

            match chosen {
                Some(index) => {
                    place(workload, &mut hosts[index]);
                    self.cursor = (index + 1) % count;
                }
                None => return Err(unschedulable(workload)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::test_support::*;

    fn host_of(hosts: &[Host], workload_id: &str) -> usize {
        hosts
            .iter()
            .position(|h| h.has_workload(workload_id))
            .unwrap()
    }

    #[test]
    fn test_cursor_advances_by_one_per_call() {
        let mut hosts = vec![host("a", 8), host("b", 8), host("c", 8)];
        let mut strategy = RoundRobinStrategy::new();

        for i in 0..7 {
            let id = format!("w{}", i);
            strategy
                .schedule(vec![workload(&id, 100, 0)], &mut hosts)
                .unwrap();
            assert_eq!(host_of(&hosts, &id), i % 3);
            assert_eq!(strategy.cursor(), (i + 1) % 3);
        }
    }

    #[test]
    fn test_skips_full_host_and_wraps() {
        let mut hosts = vec![host("a", 8), host("b", 1), host("c", 8)];
        let mut strategy = RoundRobinStrategy::new();

        strategy
            .schedule(
                vec![
                    workload("w0", 2000, 0),
                    workload("w1", 2000, 0),
                    workload("w2", 2000, 0),
                ],
                &mut hosts,
            )
            .unwrap();

        // w1 cannot fit on b, so it lands on c and w2 wraps to a
        assert_eq!(host_of(&hosts, "w0"), 0);
        assert_eq!(host_of(&hosts, "w1"), 2);
        assert_eq!(host_of(&hosts, "w2"), 0);
        assert_eq!(strategy.cursor(), 1);
    }

    #[test]
    fn test_independent_instances() {
        let mut fleet_a = vec![host("a1", 8), host("a2", 8)];
        let mut fleet_b = vec![host("b1", 8), host("b2", 8)];
        let mut rr_a = RoundRobinStrategy::new();
        let mut rr_b = RoundRobinStrategy::new();

        rr_a.schedule(vec![workload("x", 100, 0)], &mut fleet_a).unwrap();
        rr_b.schedule(vec![workload("y", 100, 0)], &mut fleet_b).unwrap();

        assert!(fleet_a[0].has_workload("x"));
        assert!(fleet_b[0].has_workload("y"));
    }

    #[test]
    fn test_failure_keeps_cursor_and_prior_placements() {
        let mut hosts = vec![host("a", 2), host("b", 2)];
        let mut strategy = RoundRobinStrategy::new();

        let err = strategy
            .schedule(
                vec![
                    workload("w0", 2000, 0),
                    workload("w1", 2000, 0),
                    workload("w2", 2000, 0),
                ],
                &mut hosts,
            )
            .unwrap_err();

        assert_eq!(err.workload_id(), Some("w2"));
        assert!(hosts[0].has_workload("w0"));
        assert!(hosts[1].has_workload("w1"));
        assert_eq!(strategy.cursor(), 0);
    }
}

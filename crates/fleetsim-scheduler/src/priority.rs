//! Priority placement

use fleetsim_core::{FleetsimResult, Host, Workload};

use crate::placement::{place_first_fit, PlacementStrategy};

/// Places workloads in descending priority order, each on the first host
/// that admits it. Ties keep their arrival order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityStrategy;

impl PlacementStrategy for PriorityStrategy {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn schedule(&mut self, mut workloads: Vec<Workload>, hosts: &mut [Host]) -> FleetsimResult<()> {
        // sort_by is stable
        workloads.sort_by(|a, b| b.priority.cmp(&a.priority));
        place_first_fit(workloads, hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::test_support::*;

    #[test]
    fn test_higher_priority_wins_sole_slot() {
        let mut hosts = vec![host("a", 4)];
        let workloads = vec![workload("low", 3000, 1), workload("high", 3000, 5)];

        let err = PriorityStrategy.schedule(workloads, &mut hosts).unwrap_err();
        assert_eq!(err.workload_id(), Some("low"));
        assert!(hosts[0].has_workload("high"));
        assert!(!hosts[0].has_workload("low"));
    }

    #[test]
    fn test_lower_priority_displaced_to_next_host() {
        let mut hosts = vec![host("a", 4), host("b", 4)];
        let workloads = vec![workload("low", 3000, 1), workload("high", 3000, 5)];

        PriorityStrategy.schedule(workloads, &mut hosts).unwrap();
        assert_eq!(
            placement(&hosts),
            vec![
                ("high".to_string(), "a".to_string()),
                ("low".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut hosts = vec![host("a", 16)];
        let workloads = vec![
            workload("first", 100, 2),
            workload("second", 100, 2),
            workload("urgent", 100, 9),
        ];

        PriorityStrategy.schedule(workloads, &mut hosts).unwrap();
        let order: Vec<&str> = hosts[0].workloads.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["urgent", "first", "second"]);
    }
}

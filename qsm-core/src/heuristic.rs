use std::cmp::Ordering;

use crate::pi_class::{Assignment, PiClassStore};

/// Which comparator [`DecisionHeuristic`] uses to rank candidates,
/// selected by the `--prefer-consts` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    LessCoverage,
    ConstOrLessCoverage,
}

/// Picks the next class to branch on. Holds only the active comparator;
/// it borrows the class store for the duration of a single `select`
/// call rather than keeping a permanent reference to it.
pub struct DecisionHeuristic {
    comparator: Comparator,
}

impl DecisionHeuristic {
    pub fn new(comparator: Comparator) -> Self {
        DecisionHeuristic { comparator }
    }

    /// The store index of the minimum class under the active strict weak
    /// ordering, or `None` if every class is already assigned.
    pub fn select(&self, store: &PiClassStore) -> Option<usize> {
        store.indices().min_by(|&a, &b| self.compare(store, a, b))
    }

    fn compare(&self, store: &PiClassStore, a: usize, b: usize) -> Ordering {
        match self.comparator {
            Comparator::LessCoverage => less_coverage(store, a, b),
            Comparator::ConstOrLessCoverage => const_or_less_coverage(store, a, b),
        }
    }
}

fn is_assigned(store: &PiClassStore, idx: usize) -> bool {
    store.state(idx).val != Assignment::Unassigned
}

/// Default comparator: unassigned first, then ascending coverage, then
/// descending pid.
fn less_coverage(store: &PiClassStore, a: usize, b: usize) -> Ordering {
    is_assigned(store, a)
        .cmp(&is_assigned(store, b))
        .then_with(|| store.state(a).coverage.cmp(&store.state(b).coverage))
        .then_with(|| store.descriptor(b).pid.cmp(&store.descriptor(a).pid))
}

/// `--prefer-consts` comparator: unassigned first, then ascending cost,
/// then ascending coverage, then classes with `has_all_const`, then
/// classes with any `has_const`, then descending pid.
fn const_or_less_coverage(store: &PiClassStore, a: usize, b: usize) -> Ordering {
    let da = store.descriptor(a);
    let db = store.descriptor(b);
    is_assigned(store, a)
        .cmp(&is_assigned(store, b))
        .then_with(|| da.cost.cmp(&db.cost))
        .then_with(|| store.state(a).coverage.cmp(&store.state(b).coverage))
        .then_with(|| db.has_all_const.cmp(&da.has_all_const))
        .then_with(|| (db.has_const > 0).cmp(&(da.has_const > 0)))
        .then_with(|| db.pid.cmp(&da.pid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pi_class::PiClassDescriptor;

    fn store_with(descs: Vec<PiClassDescriptor>) -> PiClassStore {
        let mut store = PiClassStore::new();
        for d in descs {
            store.push(d).unwrap();
        }
        store
    }

    #[test]
    fn less_coverage_prefers_unassigned_then_lowest_coverage_then_highest_pid() {
        let store = store_with(vec![
            PiClassDescriptor::new(1, 5, vec![1], "a".into(), 0, false).unwrap(),
            PiClassDescriptor::new(2, 5, vec![2], "b".into(), 0, false).unwrap(),
        ]);
        // both start unassigned with coverage == cost == 5; tie broken by
        // highest pid.
        let h = DecisionHeuristic::new(Comparator::LessCoverage);
        assert_eq!(h.select(&store), Some(1));
    }

    #[test]
    fn prefer_consts_picks_const_class_over_equal_cost_non_const() {
        let store = store_with(vec![
            PiClassDescriptor::new(1, 4, vec![1], "a".into(), 0, false).unwrap(),
            PiClassDescriptor::new(2, 4, vec![2], "b".into(), 1, true).unwrap(),
        ]);
        let h = DecisionHeuristic::new(Comparator::ConstOrLessCoverage);
        assert_eq!(h.select(&store), Some(1));
    }

    #[test]
    fn assigned_classes_are_skipped() {
        let mut store = store_with(vec![
            PiClassDescriptor::new(1, 5, vec![1], "a".into(), 0, false).unwrap(),
            PiClassDescriptor::new(2, 1, vec![2], "b".into(), 0, false).unwrap(),
        ]);
        store.state_mut(1).val = Assignment::Selected;
        let h = DecisionHeuristic::new(Comparator::LessCoverage);
        assert_eq!(h.select(&store), Some(0));
    }
}

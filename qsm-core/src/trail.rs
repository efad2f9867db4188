use tracing::debug;

use crate::pi_class::{Assignment, PiClassStore};

#[derive(Debug, Clone, Copy)]
enum Entry {
    Selected(i32),
    NotSelected(i32),
}

impl Entry {
    fn pid(self) -> i32 {
        match self {
            Entry::Selected(p) | Entry::NotSelected(p) => p,
        }
    }
}

/// The ordered history of class assignments, the positive-only
/// sub-trail, and the running cost/bound bookkeeping that must stay
/// consistent under arbitrary backtracks.
pub struct SearchTrail {
    trail: Vec<Entry>,
    ptrail: Vec<i32>,
    pub current_cost: i64,
    pub best_cost: i64,
    pub best_solutions: Vec<Vec<i32>>,
    pub unassigned: usize,
    pub removed: bool,
    pub cover_propagated: usize,
    all_solutions: bool,
}

impl SearchTrail {
    pub fn new(num_classes: usize, total_cost: i64, all_solutions: bool) -> Self {
        SearchTrail {
            trail: Vec::new(),
            ptrail: Vec::new(),
            current_cost: 0,
            best_cost: total_cost,
            best_solutions: Vec::new(),
            unassigned: num_classes,
            removed: false,
            cover_propagated: 0,
            all_solutions,
        }
    }

    pub fn ptrail(&self) -> &[i32] {
        &self.ptrail
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn all_solutions(&self) -> bool {
        self.all_solutions
    }

    /// `over_UB`: the branch-and-bound pruning test. Single-solution mode
    /// prunes ties; all-solutions mode lets ties through so they can be
    /// collected.
    pub fn over_ub(&self) -> bool {
        if self.all_solutions {
            self.current_cost > self.best_cost
        } else {
            self.current_cost >= self.best_cost
        }
    }

    pub fn assign_selected(&mut self, store: &mut PiClassStore, idx: usize) {
        let descriptor = store.descriptor(idx);
        let pid = descriptor.pid;
        let cost = descriptor.cost;
        debug_assert_eq!(store.state(idx).val, Assignment::Unassigned, "double assignment of pid {pid}");
        self.trail.push(Entry::Selected(pid));
        self.ptrail.push(pid);
        store.state_mut(idx).val = Assignment::Selected;
        self.unassigned -= 1;
        self.current_cost += cost;
    }

    pub fn assign_not_selected(&mut self, store: &mut PiClassStore, idx: usize) {
        let pid = store.descriptor(idx).pid;
        debug_assert_eq!(store.state(idx).val, Assignment::Unassigned, "double assignment of pid {pid}");
        self.trail.push(Entry::NotSelected(pid));
        store.state_mut(idx).val = Assignment::NotSelected;
        self.unassigned -= 1;
        self.removed = true;
    }

    /// Pop the trail down to (and including) the most recently decided
    /// selection, flipping it to not-selected: branch-and-bound's
    /// exploration of the "exclude this class" half of the search space.
    /// Returns `false` if the trail emptied with no decided entry found,
    /// meaning the search is exhausted.
    pub fn backtrack(&mut self, store: &mut PiClassStore) -> bool {
        let mut cost_diff: i64 = 0;
        while let Some(entry) = self.trail.pop() {
            let pid = entry.pid();
            let idx = store.index_of(pid).expect("trail entry pid must exist in the store");
            if let Entry::Selected(_) = entry {
                self.ptrail.pop();
                cost_diff += store.descriptor(idx).cost;
            }
            let decided = store.state(idx).decided;
            store.state_mut(idx).val = Assignment::Unassigned;
            self.unassigned += 1;
            if decided {
                store.state_mut(idx).decided = false;
                self.current_cost -= cost_diff;
                debug!(pid, "flip to not-selected");
                self.assign_not_selected(store, idx);
                return true;
            }
        }
        false
    }

    /// Consistency self-check between the full trail and the positive-only
    /// sub-trail, used by tests and debug assertions.
    pub fn ptrail_matches_positive_entries(&self) -> bool {
        let positives: Vec<i32> = self
            .trail
            .iter()
            .filter_map(|e| match e {
                Entry::Selected(p) => Some(*p),
                Entry::NotSelected(_) => None,
            })
            .collect();
        positives == self.ptrail
    }
}

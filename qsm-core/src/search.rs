use tracing::debug;

use qsm_sat::SatBackend;

use crate::coverage::CoverageHandle;
use crate::error::CoreError;
use crate::heuristic::DecisionHeuristic;
use crate::inference::{conditional_essentials, covered_classes, root_essentials};
use crate::pi_class::PiClassStore;
use crate::trail::SearchTrail;

/// Branch-and-bound search over PI-class selection.
///
/// Owns the class store and the trail; drives a SAT backend it borrows
/// for the duration of each `run`. The coverage counter is shared with
/// the backend's connected propagator through a [`CoverageHandle`], not
/// owned outright, since the backend also needs a handle on it.
pub struct SearchEngine {
    pub store: PiClassStore,
    pub trail: SearchTrail,
    /// Set when the root-level inference passes alone resolved every
    /// class, with no branch-and-bound iteration needed.
    pub resolved_at_root: bool,
    coverage: CoverageHandle,
    heuristic: DecisionHeuristic,
}

impl SearchEngine {
    pub fn new(store: PiClassStore, all_solutions: bool, heuristic: DecisionHeuristic, coverage: CoverageHandle) -> Self {
        let total_cost = store.total_cost();
        let num_classes = store.len();
        SearchEngine {
            store,
            trail: SearchTrail::new(num_classes, total_cost, all_solutions),
            resolved_at_root: false,
            coverage,
            heuristic,
        }
    }

    /// Runs the search to completion: the initial root-level inference
    /// pass, then the branch-and-bound main loop, until every branch has
    /// been explored or pruned.
    pub fn run(&mut self, backend: &mut dyn SatBackend) -> Result<(), CoreError> {
        root_essentials(backend, &mut self.store, &mut self.trail)?;
        covered_classes(backend, &mut self.store, &mut self.trail, &self.coverage)?;

        if self.trail.unassigned == 0 {
            // Resolved at root level: there is no alternative branch to
            // weigh this solution against, so it is recorded outright
            // rather than run through `evaluate_solution`'s tie-against-
            // the-trivial-upper-bound check (which would silently drop
            // it whenever the root-level cost matches the "select
            // everything" bound, notably the zero-classes case).
            self.trail.best_cost = self.trail.current_cost;
            self.trail.best_solutions = vec![self.trail.ptrail().to_vec()];
            self.resolved_at_root = true;
            debug!(cost = self.trail.best_cost, "resolved at root level, no search needed");
            return Ok(());
        }

        loop {
            if self.trail.over_ub() {
                if !self.trail.backtrack(&mut self.store) {
                    return Ok(());
                }
                conditional_essentials(backend, &mut self.store, &mut self.trail)?;
            }

            covered_classes(backend, &mut self.store, &mut self.trail, &self.coverage)?;

            if self.trail.unassigned == 0 {
                self.evaluate_solution();
                if self.trail.backtrack(&mut self.store) {
                    conditional_essentials(backend, &mut self.store, &mut self.trail)?;
                } else {
                    return Ok(());
                }
            } else if self.trail.over_ub() {
                if self.trail.backtrack(&mut self.store) {
                    conditional_essentials(backend, &mut self.store, &mut self.trail)?;
                } else {
                    return Ok(());
                }
            } else {
                self.decide();
            }
        }
    }

    fn decide(&mut self) {
        let idx = self.heuristic.select(&self.store).expect("decide called with no unassigned classes left");
        self.store.state_mut(idx).decided = true;
        debug!(pid = self.store.descriptor(idx).pid, "decide: select");
        self.trail.assign_selected(&mut self.store, idx);
    }

    /// Weighs the just-completed cover against the best seen so far, as an
    /// always-on `c `-prefixed status line, matching the original's
    /// unconditional stdout reporting of each improvement or tie.
    fn evaluate_solution(&mut self) {
        if self.trail.current_cost < self.trail.best_cost {
            self.trail.best_solutions.clear();
            self.trail.best_solutions.push(self.trail.ptrail().to_vec());
            self.trail.best_cost = self.trail.current_cost;
            println!(
                "c IMPROVED solution was found. Length: {} cost: {}",
                self.trail.ptrail().len(),
                self.trail.best_cost
            );
        } else if self.trail.current_cost == self.trail.best_cost && self.trail.all_solutions() {
            self.trail.best_solutions.push(self.trail.ptrail().to_vec());
            println!(
                "c another solution was found. Length: {} cost: {}",
                self.trail.ptrail().len(),
                self.trail.best_cost
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Comparator;
    use crate::mock_backend::MockBackend;
    use crate::pi_class::PiClassDescriptor;
    use qsm_sat::SolveResult;

    fn engine(store: PiClassStore, all_solutions: bool) -> SearchEngine {
        let coverage = CoverageHandle::new();
        SearchEngine::new(store, all_solutions, DecisionHeuristic::new(Comparator::LessCoverage), coverage)
    }

    #[test]
    fn empty_pi_file_yields_one_empty_solution_at_zero_cost() {
        let store = PiClassStore::new();
        let mut engine = engine(store, false);
        let mut backend = MockBackend::new(|_| SolveResult::Unsat);
        engine.run(&mut backend).unwrap();
        assert_eq!(engine.trail.best_cost, 0);
        assert_eq!(engine.trail.best_solutions, vec![Vec::<i32>::new()]);
    }

    #[test]
    fn single_forced_class_is_selected_via_root_essentials() {
        let mut store = PiClassStore::new();
        store.push(PiClassDescriptor::new(7, 3, vec![1], "q7".into(), 0, false).unwrap()).unwrap();
        let mut engine = engine(store, false);
        let mut backend = MockBackend::new(|assumptions| {
            if assumptions.contains(&1) {
                SolveResult::Sat
            } else {
                SolveResult::Unsat
            }
        });
        engine.run(&mut backend).unwrap();
        assert_eq!(engine.trail.best_cost, 3);
        assert_eq!(engine.trail.best_solutions, vec![vec![7]]);
    }

    #[test]
    fn two_disjoint_classes_are_both_root_essential() {
        let mut store = PiClassStore::new();
        store.push(PiClassDescriptor::new(10, 5, vec![1], "q10".into(), 0, false).unwrap()).unwrap();
        store.push(PiClassDescriptor::new(11, 2, vec![2], "q11".into(), 0, false).unwrap()).unwrap();
        let mut engine = engine(store, false);
        let mut backend = MockBackend::new(|assumptions| {
            if assumptions.contains(&1) || assumptions.contains(&2) {
                SolveResult::Sat
            } else {
                SolveResult::Unsat
            }
        });
        engine.run(&mut backend).unwrap();
        assert_eq!(engine.trail.best_cost, 7);
        assert_eq!(engine.trail.best_solutions, vec![vec![10, 11]]);
    }
}

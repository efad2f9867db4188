use std::path::Path;

use tracing::trace;

use crate::backend::{SatBackend, SolveResult};
use crate::cnf::load_dimacs;
use crate::error::SatError;
use crate::propagator::ExternalPropagator;

/// A compact, from-scratch DPLL engine with assumption support and an
/// external-propagator hook.
///
/// The branch-and-bound core treats solving as someone else's problem;
/// this backend exists because no published crate combines incremental
/// assumption-based solving with a propagator callback. It has no clause
/// learning and no inprocessing: the latter matters beyond performance,
/// since the external-propagator semantics this tool relies on require a
/// stable variable set, which a from-scratch solver with no simplification
/// pass satisfies for free.
pub struct DpllBackend {
    clauses: Vec<Vec<i32>>,
    num_vars: usize,
    /// 1-indexed by variable; 0 = unassigned, 1 = true, -1 = false.
    assignment: Vec<i8>,
    /// 1-indexed by variable; only variables registered via
    /// `add_observed_var` are reported to the connected propagator.
    observed: Vec<bool>,
    trail: Vec<i32>,
    root_trail: Vec<i32>,
    root_done: bool,
    root_conflict: bool,
    pending_assumptions: Vec<i32>,
    propagator: Option<Box<dyn ExternalPropagator>>,
    solve_calls: u64,
}

impl Default for DpllBackend {
    fn default() -> Self {
        DpllBackend {
            clauses: Vec::new(),
            num_vars: 0,
            assignment: vec![0],
            observed: vec![false],
            trail: Vec::new(),
            root_trail: Vec::new(),
            root_done: false,
            root_conflict: false,
            pending_assumptions: Vec::new(),
            propagator: None,
            solve_calls: 0,
        }
    }
}

impl DpllBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn var_of(lit: i32) -> usize {
        lit.unsigned_abs() as usize
    }

    fn ensure_capacity(&mut self, var: usize) {
        if var >= self.assignment.len() {
            self.assignment.resize(var + 1, 0);
            self.observed.resize(var + 1, false);
        }
    }

    fn value(&self, lit: i32) -> Option<bool> {
        let v = self.assignment[Self::var_of(lit)];
        if v == 0 {
            None
        } else {
            Some((v == 1) == (lit > 0))
        }
    }

    fn set(&mut self, lit: i32) {
        let v = Self::var_of(lit);
        self.assignment[v] = if lit > 0 { 1 } else { -1 };
    }

    fn unset(&mut self, lit: i32) {
        self.assignment[Self::var_of(lit)] = 0;
    }

    /// Push `lit` onto the trail and report it to the propagator.
    fn push_forced(&mut self, lit: i32, is_fixed: bool) {
        self.trail.push(lit);
        self.set(lit);
        if self.observed[Self::var_of(lit)] {
            if let Some(p) = &mut self.propagator {
                p.notify_assignment(lit, is_fixed);
            }
        }
    }

    /// Unit-propagate to a fixpoint. Returns `false` on conflict.
    /// Literals forced this way are reported with `is_fixed` as given by
    /// the caller (root-level propagation is the only case where this is
    /// `true`).
    fn propagate(&mut self, is_fixed: bool) -> bool {
        let clauses = std::mem::take(&mut self.clauses);
        let mut ok = true;
        let mut changed = true;
        while changed && ok {
            changed = false;
            for clause in &clauses {
                let mut satisfied = false;
                let mut unassigned_count = 0;
                let mut last_unassigned = 0;
                for &lit in clause {
                    match self.value(lit) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            unassigned_count += 1;
                            last_unassigned = lit;
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                if unassigned_count == 0 {
                    ok = false;
                    break;
                } else if unassigned_count == 1 {
                    self.push_forced(last_unassigned, is_fixed);
                    changed = true;
                }
            }
        }
        self.clauses = clauses;
        ok
    }

    fn pick_unassigned(&self) -> Option<i32> {
        (1..self.assignment.len()).find(|&v| self.assignment[v] == 0).map(|v| v as i32)
    }

    fn current_model(&self) -> Vec<i32> {
        (1..self.assignment.len())
            .filter(|&v| self.assignment[v] != 0)
            .map(|v| if self.assignment[v] == 1 { v as i32 } else { -(v as i32) })
            .collect()
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let lit = self.trail.pop().expect("trail non-empty");
            self.unset(lit);
        }
    }

    fn dpll_search(&mut self) -> Option<Vec<i32>> {
        let Some(var) = self.pick_unassigned() else {
            return Some(self.current_model());
        };
        if let Some(p) = &mut self.propagator {
            p.notify_new_decision_level();
        }
        for &val in &[var, -var] {
            let mark = self.trail.len();
            self.push_forced(val, false);
            if self.propagate(false) {
                if let Some(model) = self.dpll_search() {
                    return Some(model);
                }
            }
            self.undo_to(mark);
            if let Some(p) = &mut self.propagator {
                p.notify_backtrack(mark);
            }
        }
        None
    }

    fn reset_to_root(&mut self) {
        for v in self.assignment.iter_mut() {
            *v = 0;
        }
        self.trail.clear();
        for &lit in &self.root_trail {
            self.set(lit);
            self.trail.push(lit);
        }
    }

    fn ensure_root(&mut self) {
        if self.root_done {
            return;
        }
        self.root_done = true;
        if !self.propagate(true) {
            self.root_conflict = true;
        }
        self.root_trail = self.trail.clone();
    }
}

impl SatBackend for DpllBackend {
    fn read_dimacs(&mut self, path: &Path) -> Result<usize, SatError> {
        let (num_vars, clauses) = load_dimacs(path)?;
        self.num_vars = num_vars;
        self.ensure_capacity(num_vars);
        self.clauses = clauses;
        self.root_done = false;
        self.root_conflict = false;
        Ok(num_vars)
    }

    fn assume(&mut self, lit: i32) {
        self.ensure_capacity(Self::var_of(lit));
        self.pending_assumptions.push(lit);
    }

    fn solve(&mut self) -> SolveResult {
        self.solve_calls += 1;
        self.ensure_root();
        self.reset_to_root();

        if self.root_conflict {
            self.pending_assumptions.clear();
            return SolveResult::Unsat;
        }

        let assumptions = std::mem::take(&mut self.pending_assumptions);
        let mut conflict = false;
        for lit in assumptions {
            match self.value(lit) {
                Some(true) => continue,
                Some(false) => {
                    conflict = true;
                    break;
                }
                None => {
                    self.push_forced(lit, false);
                    if !self.propagate(false) {
                        conflict = true;
                        break;
                    }
                }
            }
        }

        if conflict {
            trace!("assumption set is unsatisfiable after propagation");
            return SolveResult::Unsat;
        }

        if let Some(p) = &mut self.propagator {
            // Unit propagation of the assumption prefix has reached a
            // fixpoint; hand control to our own (trivial) search
            // heuristic. This is the `cb_decide` transition point.
            let _ = p.cb_decide();
        }

        match self.dpll_search() {
            Some(model) => {
                let accepted = self
                    .propagator
                    .as_mut()
                    .map(|p| p.cb_check_found_model(&model))
                    .unwrap_or(true);
                if accepted {
                    SolveResult::Sat
                } else {
                    SolveResult::Unknown
                }
            }
            None => SolveResult::Unsat,
        }
    }

    fn active(&self) -> usize {
        self.num_vars
    }

    fn connect_external_propagator(&mut self, propagator: Box<dyn ExternalPropagator>) {
        self.propagator = Some(propagator);
    }

    fn disconnect_external_propagator(&mut self) {
        self.propagator = None;
    }

    fn add_observed_var(&mut self, var: i32) {
        let v = Self::var_of(var);
        self.ensure_capacity(v);
        self.observed[v] = true;
    }

    fn solve_calls(&self) -> u64 {
        self.solve_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::NullPropagator;

    fn backend_with_clauses(num_vars: usize, clauses: Vec<Vec<i32>>) -> DpllBackend {
        let mut b = DpllBackend::new();
        b.num_vars = num_vars;
        b.ensure_capacity(num_vars);
        b.clauses = clauses;
        b
    }

    #[test]
    fn unit_clause_is_forced_at_root() {
        let mut b = backend_with_clauses(2, vec![vec![1], vec![-1, 2]]);
        assert_eq!(b.solve(), SolveResult::Sat);
        assert_eq!(b.value(1), Some(true));
        assert_eq!(b.value(2), Some(true));
    }

    #[test]
    fn assumption_conflicting_with_root_unit_is_unsat() {
        let mut b = backend_with_clauses(1, vec![vec![1]]);
        b.assume(-1);
        assert_eq!(b.solve(), SolveResult::Unsat);
    }

    #[test]
    fn empty_clause_set_is_trivially_sat() {
        let mut b = backend_with_clauses(3, vec![]);
        assert_eq!(b.solve(), SolveResult::Sat);
    }

    #[test]
    fn solver_state_resets_between_solve_calls() {
        let mut b = backend_with_clauses(2, vec![vec![1, 2]]);
        b.assume(1);
        b.assume(-2);
        assert_eq!(b.solve(), SolveResult::Sat);
        assert_eq!(b.value(2), Some(false));

        // If the previous call's assumptions lingered, these contradicting
        // ones would conflict with them and this call would be UNSAT.
        b.assume(2);
        b.assume(-1);
        assert_eq!(b.solve(), SolveResult::Sat);
        assert_eq!(b.value(1), Some(false));
        assert_eq!(b.value(2), Some(true));
    }

    #[test]
    fn propagator_sees_root_fixed_literals_as_fixed() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Recorder(Rc<RefCell<Vec<(i32, bool)>>>);
        impl ExternalPropagator for Recorder {
            fn notify_assignment(&mut self, lit: i32, is_fixed: bool) {
                self.0.borrow_mut().push((lit, is_fixed));
            }
            fn notify_new_decision_level(&mut self) {}
            fn notify_backtrack(&mut self, _new_level: usize) {}
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut b = backend_with_clauses(2, vec![vec![1], vec![-1, 2]]);
        b.add_observed_var(1);
        b.add_observed_var(2);
        b.connect_external_propagator(Box::new(Recorder(seen.clone())));
        assert_eq!(b.solve(), SolveResult::Sat);
        assert_eq!(*seen.borrow(), vec![(1, true), (2, true)]);
    }

    #[test]
    fn unobserved_variables_are_not_reported_to_the_propagator() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Recorder(Rc<RefCell<Vec<i32>>>);
        impl ExternalPropagator for Recorder {
            fn notify_assignment(&mut self, lit: i32, _is_fixed: bool) {
                self.0.borrow_mut().push(lit);
            }
            fn notify_new_decision_level(&mut self) {}
            fn notify_backtrack(&mut self, _new_level: usize) {}
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut b = backend_with_clauses(2, vec![vec![1], vec![-1, 2]]);
        b.add_observed_var(1);
        // variable 2 is deliberately left unobserved.
        b.connect_external_propagator(Box::new(Recorder(seen.clone())));
        assert_eq!(b.solve(), SolveResult::Sat);
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn null_propagator_does_not_affect_outcome() {
        let mut b = backend_with_clauses(1, vec![vec![1], vec![-1]]);
        b.connect_external_propagator(Box::new(NullPropagator));
        assert_eq!(b.solve(), SolveResult::Unsat);
    }
}

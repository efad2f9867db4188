use std::cell::RefCell;
use std::rc::Rc;

use qsm_sat::ExternalPropagator;

/// External propagator that tallies how many observed variables become
/// fixed while the SAT solver is still inside the assumption prefix.
/// Used by the covered-classes rule as a decision score.
#[derive(Debug, Default)]
struct CoverageCounter {
    in_count: bool,
    on_assumption_level: bool,
    assumption_coverage: u64,
    root_coverage: u64,
}

impl CoverageCounter {
    fn start_coverage_count(&mut self) {
        self.in_count = true;
        self.on_assumption_level = true;
        self.assumption_coverage = self.root_coverage;
    }

    fn stop_coverage_count(&mut self) {
        self.in_count = false;
    }

    fn on_assignment(&mut self, is_fixed: bool) {
        if is_fixed {
            self.root_coverage += 1;
            if self.in_count {
                self.assumption_coverage += 1;
            }
        } else if self.in_count && self.on_assumption_level {
            self.assumption_coverage += 1;
        }
    }

    fn on_decide(&mut self) -> i32 {
        self.on_assumption_level = false;
        0
    }
}

/// A cloneable handle onto a [`CoverageCounter`]. The SAT backend owns a
/// boxed [`CoverageAdapter`] wrapping one clone of the shared cell; the
/// search engine keeps the handle itself to bracket SAT queries with
/// `start_coverage_count`/`stop_coverage_count` and read the tally back
/// afterwards. Sharing through `Rc<RefCell<_>>` avoids a permanent
/// engine-into-propagator back-reference.
#[derive(Clone, Default)]
pub struct CoverageHandle(Rc<RefCell<CoverageCounter>>);

impl CoverageHandle {
    pub fn new() -> Self {
        CoverageHandle(Rc::new(RefCell::new(CoverageCounter::default())))
    }

    pub fn start_coverage_count(&self) {
        self.0.borrow_mut().start_coverage_count();
    }

    pub fn stop_coverage_count(&self) {
        self.0.borrow_mut().stop_coverage_count();
    }

    pub fn assumption_coverage(&self) -> u64 {
        self.0.borrow().assumption_coverage
    }

    /// Build the boxed value handed to
    /// [`qsm_sat::SatBackend::connect_external_propagator`].
    pub fn adapter(&self) -> Box<dyn ExternalPropagator> {
        Box::new(CoverageAdapter(self.0.clone()))
    }
}

struct CoverageAdapter(Rc<RefCell<CoverageCounter>>);

impl ExternalPropagator for CoverageAdapter {
    fn notify_assignment(&mut self, _lit: i32, is_fixed: bool) {
        self.0.borrow_mut().on_assignment(is_fixed);
    }

    fn notify_new_decision_level(&mut self) {}

    fn notify_backtrack(&mut self, _new_level: usize) {}

    fn cb_decide(&mut self) -> i32 {
        self.0.borrow_mut().on_decide()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_fixed_assignments_count_regardless_of_in_count() {
        let handle = CoverageHandle::new();
        let mut adapter = handle.adapter();
        adapter.notify_assignment(1, true);
        adapter.notify_assignment(2, true);
        handle.start_coverage_count();
        // root_coverage (2) seeds assumption_coverage at start.
        assert_eq!(handle.assumption_coverage(), 2);
        handle.stop_coverage_count();
    }

    #[test]
    fn assumption_level_assignments_count_only_while_counting_and_pre_decide() {
        let handle = CoverageHandle::new();
        let mut adapter = handle.adapter();
        handle.start_coverage_count();
        adapter.notify_assignment(3, false);
        assert_eq!(handle.assumption_coverage(), 1);
        adapter.cb_decide();
        adapter.notify_assignment(4, false);
        // past the decide callback, no longer "on assumption level".
        assert_eq!(handle.assumption_coverage(), 1);
        handle.stop_coverage_count();
    }
}

//! A scriptable stand-in for a real SAT solver, used to exercise the
//! inference rules and the search engine without any actual CNF or
//! solver: the response to each assumption set is supplied by a closure.

use std::collections::HashSet;
use std::path::Path;

use qsm_sat::{ExternalPropagator, SatBackend, SatError, SolveResult};

pub struct MockBackend {
    pending: Vec<i32>,
    propagator: Option<Box<dyn ExternalPropagator>>,
    observed: HashSet<i32>,
    solve_calls: u64,
    responder: Box<dyn FnMut(&[i32]) -> SolveResult>,
}

impl MockBackend {
    pub fn new(responder: impl FnMut(&[i32]) -> SolveResult + 'static) -> Self {
        MockBackend {
            pending: Vec::new(),
            propagator: None,
            observed: HashSet::new(),
            solve_calls: 0,
            responder: Box::new(responder),
        }
    }
}

impl SatBackend for MockBackend {
    fn read_dimacs(&mut self, _path: &Path) -> Result<usize, SatError> {
        Ok(0)
    }

    fn assume(&mut self, lit: i32) {
        self.pending.push(lit);
    }

    fn solve(&mut self) -> SolveResult {
        self.solve_calls += 1;
        let assumptions = std::mem::take(&mut self.pending);
        let result = (self.responder)(&assumptions);
        if result == SolveResult::Sat {
            if let Some(p) = &mut self.propagator {
                for &lit in &assumptions {
                    let var = lit.unsigned_abs() as i32;
                    if self.observed.contains(&var) {
                        p.notify_assignment(lit, false);
                    }
                }
                let _ = p.cb_decide();
            }
        }
        result
    }

    fn active(&self) -> usize {
        0
    }

    fn connect_external_propagator(&mut self, propagator: Box<dyn ExternalPropagator>) {
        self.propagator = Some(propagator);
    }

    fn disconnect_external_propagator(&mut self) {
        self.propagator = None;
    }

    fn add_observed_var(&mut self, var: i32) {
        self.observed.insert(var.unsigned_abs() as i32);
    }

    fn solve_calls(&self) -> u64 {
        self.solve_calls
    }
}

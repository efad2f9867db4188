use std::path::Path;

use crate::error::SatError;
use crate::propagator::ExternalPropagator;

/// Result of a [`SatBackend::solve`] call, mirroring the three return
/// codes of the IPASIR-style contract this crate stands in for (10/20/0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Sat,
    Unsat,
    /// The solver could not decide. Every workload this tool addresses is
    /// expected to terminate decisively; an `Unknown` result is treated
    /// as fatal by callers.
    Unknown,
}

/// The SAT-solver contract the branch-and-bound core (`qsm-core`) is
/// written against. Any incremental, assumption-based CDCL solver
/// exposing an external-propagator hook can implement this; the core
/// never depends on a concrete backend.
pub trait SatBackend {
    /// Load a DIMACS file, returning the declared variable count.
    fn read_dimacs(&mut self, path: &Path) -> Result<usize, SatError>;

    /// Stage a literal as an assumption for the next [`solve`](Self::solve).
    fn assume(&mut self, lit: i32);

    /// Solve under the staged assumptions, then clear them.
    fn solve(&mut self) -> SolveResult;

    /// Number of active (non-eliminated) variables.
    fn active(&self) -> usize;

    /// Attach a propagator. Replaces any previously connected one.
    fn connect_external_propagator(&mut self, propagator: Box<dyn ExternalPropagator>);

    /// Detach the currently connected propagator, if any.
    fn disconnect_external_propagator(&mut self);

    /// Register a variable the connected propagator wants to observe.
    fn add_observed_var(&mut self, var: i32);

    /// Total number of [`solve`](Self::solve) calls made so far.
    fn solve_calls(&self) -> u64;
}

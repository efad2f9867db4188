//! The three SAT-driven inference rules used to shrink the unassigned
//! set before branching: root-essential, conditional-essential, and
//! covered-class detection.
//!
//! Convention shared with the CNF encoding that produces the input: the
//! bare literal `pid` means "do not select class `pid`"; asserting a
//! class's `care_lits` means "select this class". The core relies on
//! this but does not itself define the encoding.

use tracing::debug;

use qsm_sat::{SatBackend, SolveResult};

use crate::coverage::CoverageHandle;
use crate::error::CoreError;
use crate::pi_class::{Assignment, PiClassStore};
use crate::trail::SearchTrail;

fn solve_query(backend: &mut dyn SatBackend) -> Result<bool, CoreError> {
    match backend.solve() {
        SolveResult::Sat => Ok(true),
        SolveResult::Unsat => Ok(false),
        SolveResult::Unknown => Err(CoreError::SolverUnknown),
    }
}

/// A class is root-essential if, with only its own `care_lits` asserted
/// and every other class forced to "not selected", the formula is still
/// satisfiable: no other combination of classes can substitute for it.
/// Scans in load order, collecting essentials into a staging buffer and
/// applying them only after the full scan so each query sees the same
/// (empty) partial assignment, which also makes the rule idempotent:
/// a second run finds every candidate already assigned.
pub fn root_essentials(backend: &mut dyn SatBackend, store: &mut PiClassStore, trail: &mut SearchTrail) -> Result<(), CoreError> {
    let all_pids: Vec<i32> = store.indices().map(|i| store.descriptor(i).pid).collect();
    let mut staging = Vec::new();
    for i in store.indices() {
        if store.state(i).val != Assignment::Unassigned {
            continue;
        }
        for &lit in &store.descriptor(i).care_lits {
            backend.assume(lit);
        }
        for (j, &pid_j) in all_pids.iter().enumerate() {
            if j != i {
                backend.assume(pid_j);
            }
        }
        if solve_query(backend)? {
            staging.push(i);
        }
    }
    for &idx in &staging {
        debug!(pid = store.descriptor(idx).pid, "root essential");
        trail.assign_selected(store, idx);
    }
    Ok(())
}

/// A class is essential relative to the current committed partial cover
/// (`ptrail`): with that cover and every other still-unassigned class
/// excluded, the formula remains satisfiable only if this class is also
/// selected. Skipped entirely when nothing has been excluded since the
/// last pass (no work to redo).
pub fn conditional_essentials(backend: &mut dyn SatBackend, store: &mut PiClassStore, trail: &mut SearchTrail) -> Result<(), CoreError> {
    if trail.trail_len() == trail.ptrail().len() || !trail.removed {
        return Ok(());
    }
    trail.removed = false;

    let ptrail_snapshot: Vec<i32> = trail.ptrail().to_vec();
    let unassigned: Vec<usize> = store.indices().filter(|&i| store.state(i).val == Assignment::Unassigned).collect();

    let mut staging = Vec::new();
    for &i in &unassigned {
        for &lit in &ptrail_snapshot {
            backend.assume(lit);
        }
        for &j in &unassigned {
            if j != i {
                backend.assume(store.descriptor(j).pid);
            }
        }
        for &lit in &store.descriptor(i).care_lits {
            backend.assume(lit);
        }
        if solve_query(backend)? {
            staging.push(i);
        }
    }
    for &idx in &staging {
        debug!(pid = store.descriptor(idx).pid, "conditional essential");
        trail.assign_selected(store, idx);
    }
    Ok(())
}

/// Detects classes already made redundant by the committed cover
/// (UNSAT under `ptrail` plus this class's `care_lits`, meaning no model
/// needs it), and otherwise refreshes the coverage heuristic score for
/// classes that are still live. Skipped once already run at the current
/// `ptrail` length.
pub fn covered_classes(
    backend: &mut dyn SatBackend,
    store: &mut PiClassStore,
    trail: &mut SearchTrail,
    coverage: &CoverageHandle,
) -> Result<(), CoreError> {
    if trail.cover_propagated == trail.ptrail().len() {
        return Ok(());
    }

    let ptrail_snapshot: Vec<i32> = trail.ptrail().to_vec();
    let unassigned: Vec<usize> = store.indices().filter(|&i| store.state(i).val == Assignment::Unassigned).collect();

    let mut to_remove = Vec::new();
    for &i in &unassigned {
        for &lit in &ptrail_snapshot {
            backend.assume(lit);
        }
        for &lit in &store.descriptor(i).care_lits {
            backend.assume(lit);
        }
        coverage.start_coverage_count();
        let res = backend.solve();
        coverage.stop_coverage_count();
        match res {
            SolveResult::Unsat => to_remove.push(i),
            SolveResult::Sat => store.state_mut(i).coverage = coverage.assumption_coverage(),
            SolveResult::Unknown => return Err(CoreError::SolverUnknown),
        }
    }

    for &idx in &to_remove {
        debug!(pid = store.descriptor(idx).pid, "covered, excluding");
        trail.assign_not_selected(store, idx);
    }
    trail.cover_propagated = trail.ptrail().len();
    Ok(())
}

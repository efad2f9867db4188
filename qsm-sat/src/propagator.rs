//! The external-propagator capability.
//!
//! Modeled as an explicit capability trait rather than a base class: a
//! [`SatBackend`](crate::SatBackend) holds at most one `Box<dyn
//! ExternalPropagator>` and calls into it synchronously from within
//! `solve`. Implementors observe assignments and decisions; they do not
//! get to touch the backend's own state.
pub trait ExternalPropagator {
    /// A literal has become fixed. `is_fixed` distinguishes a root-level
    /// (permanent, independent of any assumption) assignment from one
    /// that only holds as a consequence of the currently staged
    /// assumptions.
    fn notify_assignment(&mut self, lit: i32, is_fixed: bool);

    /// The solver is about to push a new decision level.
    fn notify_new_decision_level(&mut self);

    /// The solver backtracked to the given decision level.
    fn notify_backtrack(&mut self, new_level: usize);

    /// The solver is about to make its own branching decision (i.e. the
    /// assumption prefix and its propagation consequences have reached a
    /// fixpoint). Returning `0` means "no preference, use your own
    /// heuristic".
    fn cb_decide(&mut self) -> i32 {
        0
    }

    /// The propagator may force a literal to be propagated. `0` means
    /// nothing to propagate.
    fn cb_propagate(&mut self) -> i32 {
        0
    }

    /// Called when the backend has found a complete, conflict-free
    /// assignment. Returning `false` vetoes the model (the backend must
    /// keep searching).
    fn cb_check_found_model(&mut self, model: &[i32]) -> bool {
        let _ = model;
        true
    }

    /// Whether the propagator wants to add a clause right now.
    fn cb_has_external_clause(&mut self) -> bool {
        false
    }

    /// Drain one literal of the clause the propagator wants to add. `0`
    /// terminates the clause.
    fn cb_add_external_clause_lit(&mut self) -> i32 {
        0
    }

    /// Drain one literal of the reason clause for a propagated literal.
    /// `0` terminates the clause.
    fn cb_add_reason_clause_lit(&mut self, propagated_lit: i32) -> i32 {
        let _ = propagated_lit;
        0
    }
}

/// A propagator that observes nothing and never vetoes anything; used
/// when no coverage counting is needed (e.g. unit tests that only care
/// about SAT/UNSAT).
#[derive(Debug, Default)]
pub struct NullPropagator;

impl ExternalPropagator for NullPropagator {
    fn notify_assignment(&mut self, _lit: i32, _is_fixed: bool) {}
    fn notify_new_decision_level(&mut self) {}
    fn notify_backtrack(&mut self, _new_level: usize) {}
}

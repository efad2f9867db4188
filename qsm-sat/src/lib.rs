//! A minimal incremental, assumption-based SAT solver contract, plus a
//! compact built-in backend, used as the search substrate for `qsm-core`.

mod backend;
mod cnf;
mod dpll;
mod error;
mod propagator;

pub use backend::{SatBackend, SolveResult};
pub use cnf::load_dimacs;
pub use dpll::DpllBackend;
pub use error::SatError;
pub use propagator::{ExternalPropagator, NullPropagator};

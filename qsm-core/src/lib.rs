//! The weighted set-cover / minimum-cost prime-implicant selection
//! engine: a branch-and-bound search over PI-class selection, driven by
//! SAT queries against an incremental assumption-based solver.

mod coverage;
mod error;
mod heuristic;
mod inference;
#[cfg(test)]
mod mock_backend;
mod pi_class;
mod pic_file;
mod search;
mod trail;

pub use coverage::CoverageHandle;
pub use error::CoreError;
pub use heuristic::{Comparator, DecisionHeuristic};
pub use pi_class::{Assignment, PiClassDescriptor, PiClassState, PiClassStore};
pub use pic_file::load_pic_file;
pub use search::SearchEngine;
pub use trail::SearchTrail;

use std::path::PathBuf;

/// Errors surfaced while loading input or driving the search.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("could not read PI-class file {path}: {source}")]
    PicIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed PI-class file {path}, line {line}: {reason}")]
    PicFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Sat(#[from] qsm_sat::SatError),

    #[error("SAT solver returned an undecided result; this search cannot proceed")]
    SolverUnknown,
}

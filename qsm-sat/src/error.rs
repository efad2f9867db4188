use std::path::PathBuf;

/// Errors surfaced by a [`crate::SatBackend`] while loading or solving a formula.
#[derive(Debug, thiserror::Error)]
pub enum SatError {
    #[error("could not read DIMACS file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing DIMACS file {path}: {source}")]
    Dimacs {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

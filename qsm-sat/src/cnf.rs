use std::fs;
use std::path::Path;

use crate::error::SatError;

/// Load a DIMACS CNF file using the `varisat` family of crates and
/// flatten it into plain signed-integer clauses.
pub fn load_dimacs(path: &Path) -> Result<(usize, Vec<Vec<i32>>), SatError> {
    let text = fs::read_to_string(path).map_err(|source| SatError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let formula =
        varisat_dimacs::DimacsParser::parse(text.as_bytes()).map_err(|source| SatError::Dimacs {
            path: path.to_path_buf(),
            source,
        })?;

    let num_vars = formula.var_count();
    let mut clauses = Vec::new();
    for clause in formula.iter() {
        let mut out = Vec::with_capacity(clause.len());
        for &lit in clause {
            let var = lit.var().to_dimacs() as i32;
            out.push(if lit.is_positive() { var } else { -var });
        }
        clauses.push(out);
    }
    Ok((num_vars, clauses))
}

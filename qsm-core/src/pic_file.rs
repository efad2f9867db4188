use std::fs;
use std::path::Path;

use crate::error::CoreError;
use crate::pi_class::{PiClassDescriptor, PiClassStore};

/// Parses the PI-class descriptor file: one class per line, six
/// semicolon-delimited fields, `pid;cost;care
/// lits;has_const;has_all_const;qform`.
pub fn load_pic_file(path: &Path) -> Result<PiClassStore, CoreError> {
    let text = fs::read_to_string(path).map_err(|source| CoreError::PicIo {
        path: path.to_path_buf(),
        source,
    })?;

    let mut store = PiClassStore::new();
    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        let descriptor = parse_line(path, line_no + 1, line)?;
        store.push(descriptor).map_err(|reason| CoreError::PicFormat {
            path: path.to_path_buf(),
            line: line_no + 1,
            reason,
        })?;
    }
    Ok(store)
}

fn parse_line(path: &Path, line_no: usize, line: &str) -> Result<PiClassDescriptor, CoreError> {
    let fail = |reason: String| CoreError::PicFormat {
        path: path.to_path_buf(),
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() != 6 {
        return Err(fail(format!("expected 6 semicolon-delimited fields, found {}", fields.len())));
    }

    let pid: i32 = fields[0].trim().parse().map_err(|_| fail(format!("invalid pid {:?}", fields[0])))?;
    let cost: i64 = fields[1].trim().parse().map_err(|_| fail(format!("invalid cost {:?}", fields[1])))?;

    let mut care_lits = Vec::new();
    for tok in fields[2].split_whitespace() {
        let lit: i32 = tok.parse().map_err(|_| fail(format!("invalid literal {tok:?}")))?;
        if lit == 0 {
            return Err(fail("literal list must not contain 0".to_string()));
        }
        care_lits.push(lit);
    }

    let has_const: u32 = fields[3].trim().parse().map_err(|_| fail(format!("invalid has_const {:?}", fields[3])))?;
    let has_all_const_raw: i64 = fields[4]
        .trim()
        .parse()
        .map_err(|_| fail(format!("invalid has_all_const {:?}", fields[4])))?;
    let qform = fields[5].to_string();

    PiClassDescriptor::new(pid, cost, care_lits, qform, has_const, has_all_const_raw != 0).map_err(fail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fake_path() -> PathBuf {
        PathBuf::from("test.pic")
    }

    #[test]
    fn parses_a_well_formed_line() {
        let d = parse_line(&fake_path(), 1, "7;3;1 2;0;0;a|b").unwrap();
        assert_eq!(d.pid, 7);
        assert_eq!(d.cost, 3);
        assert_eq!(d.care_lits, vec![1, 2]);
        assert_eq!(d.qform, "a|b");
        assert!(!d.has_all_const);
    }

    #[test]
    fn has_all_const_is_true_on_any_nonzero_value() {
        let d = parse_line(&fake_path(), 1, "5;1;3;1;7;c").unwrap();
        assert!(d.has_all_const);
        assert_eq!(d.has_const, 1);
    }

    #[test]
    fn rejects_zero_literal() {
        assert!(parse_line(&fake_path(), 1, "7;3;0;0;0;a").is_err());
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_line(&fake_path(), 1, "7;3;1;0;0").is_err());
        assert!(parse_line(&fake_path(), 1, "7;3;1;0;0;a;extra").is_err());
    }

    #[test]
    fn rejects_non_integer_pid() {
        assert!(parse_line(&fake_path(), 1, "x;3;1;0;0;a").is_err());
    }

    #[test]
    fn rejects_non_positive_cost() {
        assert!(parse_line(&fake_path(), 1, "7;0;1;0;0;a").is_err());
    }

    #[test]
    fn lines_accumulate_into_the_store_in_order() {
        let mut store = PiClassStore::new();
        for line in ["7;3;1;0;0;a", "5;1;2;1;1;b"] {
            let d = parse_line(&fake_path(), 1, line).unwrap();
            store.push(d).unwrap();
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.index_of(7), Some(0));
        assert_eq!(store.index_of(5), Some(1));
    }

    #[test]
    fn a_blank_line_is_rejected() {
        assert!(parse_line(&fake_path(), 1, "").is_err());
    }
}

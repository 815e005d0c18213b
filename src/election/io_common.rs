use std::path::Path;

use voting_rules::ValuationSource;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Parses the content of a cell. Empty cells have no value.
pub fn parse_value(s: &str) -> Option<Result<f64, std::num::ParseFloatError>> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.parse::<f64>())
    }
}

/// The raw content of one or more input files, row by row.
/// Missing cells are kept as holes and rejected later, when the valuation table is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueGrid {
    pub rows: Vec<Vec<Option<f64>>>,
}

impl ValueGrid {
    pub fn append(&mut self, mut other: ValueGrid) {
        self.rows.append(&mut other.rows);
    }
}

impl ValuationSource for ValueGrid {
    fn max_row(&self) -> usize {
        self.rows.len()
    }

    fn max_column(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .flatten()
    }
}

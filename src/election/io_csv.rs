// Primitives for reading CSV files.

use std::fs::File;

use crate::election::io_common::{parse_value, ValueGrid};
use crate::election::*;

pub fn read_csv_values(path: String, cfs: &FileSource) -> ElectionResult<ValueGrid> {
    let first_col = cfs.first_value_column_index()?;
    let (records, row_offset) = get_records(&path, cfs)?;

    let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let mut row: Vec<Option<f64>> = Vec::new();
        for cell in line.iter().skip(first_col) {
            let v = match parse_value(cell) {
                None => None,
                Some(Ok(x)) => Some(x),
                Some(Err(_)) => {
                    return CsvWrongCellTypeSnafu {
                        lineno,
                        content: cell.to_string(),
                    }
                    .fail();
                }
            };
            row.push(v);
        }
        debug!("read_csv_values: lineno: {:?} row: {:?}", lineno, &row);
        rows.push(row);
    }
    Ok(ValueGrid { rows })
}

fn get_records(
    path: &String,
    cfs: &FileSource,
) -> ElectionResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_value_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::election::io_common::{parse_value, ValueGrid};
use crate::election::*;

pub fn read_excel_values(path: String, cfs: &FileSource) -> ElectionResult<ValueGrid> {
    let wrange = get_range(&path, cfs)?;
    let first_row = cfs.first_value_row_index()?;
    let first_col = cfs.first_value_column_index()?;

    // The range only covers the used cells: it may not start at A1.
    let (start_row, start_col) = match wrange.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => (0, 0),
    };
    debug!(
        "read_excel_values: range starts at {:?}, values at {:?}",
        (start_row, start_col),
        (first_row, first_col)
    );

    let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let row_idx = start_row + idx;
        if row_idx < first_row {
            continue;
        }
        let lineno = (row_idx + 1) as u64;
        let mut values: Vec<Option<f64>> = Vec::new();
        for _ in first_col..start_col {
            values.push(None);
        }
        for (col_idx, cell) in row.iter().enumerate() {
            if start_col + col_idx < first_col {
                continue;
            }
            let v = match cell {
                DataType::Float(f) => Some(*f),
                DataType::Int(i) => Some(*i as f64),
                DataType::Empty => None,
                DataType::String(s) => match parse_value(s) {
                    None => None,
                    Some(Ok(x)) => Some(x),
                    Some(Err(_)) => {
                        return ExcelWrongCellTypeSnafu {
                            lineno,
                            content: s.clone(),
                        }
                        .fail();
                    }
                },
                x => {
                    return ExcelWrongCellTypeSnafu {
                        lineno,
                        content: format!("{:?}", x),
                    }
                    .fail();
                }
            };
            values.push(v);
        }
        // Trailing empty cells come from longer rows elsewhere in the sheet.
        while let Some(None) = values.last() {
            values.pop();
        }
        debug!("read_excel_values: lineno: {:?} row: {:?}", lineno, &values);
        if values.is_empty() {
            continue;
        }
        rows.push(values);
    }
    Ok(ValueGrid { rows })
}

fn get_range(path: &String, cfs: &FileSource) -> ElectionResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path: path.clone() })?;

    let wrange = if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path: path.clone() })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path: path.clone() })?
    };
    Ok(wrange)
}

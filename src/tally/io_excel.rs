// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;

use round_tally::{Cell, VoteTable};

use crate::tally::*;

/// Reads the table from the given worksheet, or from the first worksheet.
/// The first row is the header.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> TallyResult<VoteTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let headers: Vec<String> = match iter.next() {
        Some(header) => header
            .iter()
            .map(|c| read_cell(c).text().trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    debug!("read_excel_table: header: {:?}", headers);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<Cell> = row.iter().map(read_cell).collect();
        debug!("read_excel_table: idx: {:?} row: {:?}", idx, cells);
        rows.push(cells);
    }
    Ok(VoteTable::new(headers, rows))
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(s) if s.trim().is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::DateTime(f) => Cell::Number(*f),
        // Formula errors and the like.
        _ => Cell::Empty,
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> TallyResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_table: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange_o = match worksheet_name {
        // A worksheet name was provided, use it.
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    };
    let wrange = wrange_o
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}

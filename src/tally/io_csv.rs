// Primitives for reading CSV files.

use log::debug;

use round_tally::{Cell, VoteTable};

use crate::tally::{io_common::*, *};

/// Reads a CSV table. The first row is the header; all the cells are read as text.
pub fn read_csv_table(path: &str) -> TallyResult<VoteTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let headers: Vec<String> = rdr
        .headers()
        .context(ReadingCsvSnafu { path, lineno: 1_usize })?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let h = if idx == 0 { strip_bom(h) } else { h };
            h.to_string()
        })
        .collect();
    debug!("read_csv_table: headers: {:?}", headers);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(ReadingCsvSnafu { path, lineno })?;
        let row: Vec<Cell> = line.iter().map(text_cell).collect();
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, row);
        rows.push(row);
    }
    Ok(VoteTable::new(headers, rows))
}

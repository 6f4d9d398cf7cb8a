// Primitives for reading the parameter sheet from CSV files.

use std::fs::File;
use std::io::Read;

use csv::Reader;
use log::debug;
use snafu::prelude::*;

use form_engine::builder::Schema;
use form_engine::CellValue;

use crate::form::{
    io_common::{assemble_row, build_schema, get_col_index_mapping, sniff_cell},
    *,
};

/// Reads a CSV export of the form table. The first line is the header and
/// the first column holds the field ids.
pub fn read_csv_schema(path: &str) -> AssessResult<Schema> {
    let rdr = get_reader(path)?;
    read_csv_records(rdr)
}

pub fn read_csv_records<R: Read>(mut rdr: Reader<R>) -> AssessResult<Schema> {
    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .iter()
        .map(|s| Some(s.trim().to_string()))
        .collect();
    debug!("read_csv_records: header: {:?}", header);
    let col_indexes = get_col_index_mapping(&header)?;

    let mut rows = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<CellValue> = line.iter().map(sniff_cell).collect();
        debug!("read_csv_records: lineno: {:?} cells: {:?}", lineno, cells);
        rows.push((lineno, assemble_row(&cells, &col_indexes)));
    }
    build_schema(rows.into_iter())
}

fn get_reader(path: &str) -> AssessResult<Reader<File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })
}

// Primitives shared by the parameter sheet readers.

use log::debug;
use std::collections::HashMap;

use form_engine::builder::{columns, Schema, SchemaBuilder};
use form_engine::{CellValue, RawRow};
use snafu::prelude::*;

use crate::form::*;

/// Reads a text cell the way a spreadsheet would have typed it.
pub fn sniff_cell(s: &str) -> CellValue {
    let t = s.trim();
    if t.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(i) = t.parse::<i64>() {
        return CellValue::Int(i);
    }
    // Words such as "inf" or "nan" stay text.
    if t.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(f) = t.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    match t.to_lowercase().as_str() {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => CellValue::Text(t.to_string()),
    }
}

/// Given the header of a sheet, finds the position of every named column.
///
/// The first column is the id column, whatever its name. The returned
/// positions follow the order of `columns::ALL`.
pub fn get_col_index_mapping(header: &[Option<String>]) -> AssessResult<Vec<usize>> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.clone(), idx)))
        .collect();

    debug!("get_col_index_mapping: col_names: {:?}", col_names);

    let mut col_indexes: Vec<usize> = Vec::new();
    for cname in columns::ALL {
        let idx = col_names
            .get(cname)
            .context(MissingColumnSnafu { name: cname })?;
        col_indexes.push(*idx);
    }
    Ok(col_indexes)
}

/// Picks the cells of one row according to the column mapping.
pub fn assemble_row(cells: &[CellValue], col_indexes: &[usize]) -> RawRow {
    let cell = |idx: usize| cells.get(idx).cloned().unwrap_or(CellValue::Empty);
    let col = |pos: usize| col_indexes.get(pos).map(|idx| cell(*idx)).unwrap_or(CellValue::Empty);
    RawRow {
        id: cell(0),
        group_id: col(0),
        has_checkbox: col(1),
        checkbox_label: col(2),
        checkbox_default: col(3),
        has_header: col(4),
        header_label: col(5),
        format_spec: col(6),
        min: col(7),
        max: col(8),
        default: col(9),
        step: col(10),
        label: col(11),
        widget_key: col(12),
        widget_kind: col(13),
        attr: col(14),
        entity: col(15),
    }
}

/// Builds the schema out of numbered rows, reporting the line of the first bad row.
pub fn build_schema(rows: impl Iterator<Item = (usize, RawRow)>) -> AssessResult<Schema> {
    let mut builder = SchemaBuilder::new();
    for (lineno, row) in rows {
        builder.add_row(&row).context(InvalidRowSnafu { lineno })?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffing_cells() {
        assert_eq!(sniff_cell(""), CellValue::Empty);
        assert_eq!(sniff_cell("  "), CellValue::Empty);
        assert_eq!(sniff_cell("12"), CellValue::Int(12));
        assert_eq!(sniff_cell("-0.5"), CellValue::Float(-0.5));
        assert_eq!(sniff_cell("TRUE"), CellValue::Bool(true));
        assert_eq!(sniff_cell("False"), CellValue::Bool(false));
        assert_eq!(sniff_cell("%.2f"), CellValue::Text("%.2f".to_string()));
        assert_eq!(sniff_cell("nan"), CellValue::Text("nan".to_string()));
        assert_eq!(
            sniff_cell(" How many lions? "),
            CellValue::Text("How many lions?".to_string())
        );
    }

    fn header() -> Vec<Option<String>> {
        let mut h = vec![Some("whatever".to_string())];
        h.extend(columns::ALL.iter().rev().map(|s| Some(s.to_string())));
        h
    }

    #[test]
    fn columns_are_found_by_name() {
        let idx = get_col_index_mapping(&header()).unwrap();
        // The header was reversed after the id column.
        assert_eq!(idx[0], 16);
        assert_eq!(idx[15], 1);
    }

    #[test]
    fn missing_column_is_reported() {
        let mut h = header();
        h.retain(|c| c.as_deref() != Some("st_widget"));
        let err = get_col_index_mapping(&h).unwrap_err();
        assert!(matches!(err, AssessError::MissingColumn { name } if name == "st_widget"));
    }

    #[test]
    fn short_rows_are_padded() {
        let idx: Vec<usize> = (1..=16).collect();
        let row = assemble_row(&[CellValue::Int(7), CellValue::Text("g".to_string())], &idx);
        assert_eq!(row.id, CellValue::Int(7));
        assert_eq!(row.group_id, CellValue::Text("g".to_string()));
        assert_eq!(row.entity, CellValue::Empty);
    }
}

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, warn};
use snafu::prelude::*;

use form_engine::builder::Schema;
use form_engine::CellValue;

use crate::form::{
    io_common::{assemble_row, build_schema, get_col_index_mapping},
    *,
};

/// Reads the form table of an Excel workbook.
///
/// `columns` is the zero-based, inclusive window of sheet columns holding the
/// table. Its first row is the header, its first column the field id.
pub fn read_xlsx_schema(
    path: &str,
    worksheet_name: &str,
    columns: (usize, usize),
) -> AssessResult<Schema> {
    let wrange = get_range(path, worksheet_name)?;
    // Cells of the range are relative to its top-left corner.
    let (row0, col0) = wrange.start().unwrap_or((0, 0));
    let (first, last) = columns;
    debug!(
        "read_xlsx_schema: range starts at {:?}, window {:?}",
        (row0, col0),
        columns
    );

    let window = |row: &[DataType]| -> Vec<CellValue> {
        (first..=last)
            .map(|col| {
                col.checked_sub(col0 as usize)
                    .and_then(|idx| row.get(idx))
                    .map(read_cell)
                    .unwrap_or(CellValue::Empty)
            })
            .collect()
    };

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let header: Vec<Option<String>> = window(header_row)
        .iter()
        .map(|c| match c {
            CellValue::Text(s) => Some(s.trim().to_string()),
            _ => None,
        })
        .collect();
    debug!("read_xlsx_schema: header: {:?}", header);
    let col_indexes = get_col_index_mapping(&header)?;

    // Line numbers as displayed by the spreadsheet: one-based, after the header.
    let first_line = row0 as usize + 2;
    build_schema(
        iter.enumerate()
            .map(|(idx, row)| (idx + first_line, assemble_row(&window(row), &col_indexes))),
    )
}

fn read_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::Int(i) => CellValue::Int(*i),
        DataType::Float(f) => CellValue::Float(*f),
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::DateTime(f) => CellValue::Float(*f),
        other => {
            warn!("read_cell: cannot use cell {:?}, treating it as empty", other);
            CellValue::Empty
        }
    }
}

fn get_range(path: &str, worksheet_name: &str) -> AssessResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let available = workbook.sheet_names().join(", ");
    let wrange = workbook
        .worksheet_range(worksheet_name)
        .context(MissingWorksheetSnafu {
            name: worksheet_name,
            path,
            available,
        })?
        .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_engine::{Value, WidgetKind};

    fn parms_path() -> String {
        [env!("CARGO_MANIFEST_DIR"), "tests", "zoo", "parms.xlsx"]
            .iter()
            .collect::<std::path::PathBuf>()
            .display()
            .to_string()
    }

    #[test]
    fn reads_the_form_table() {
        let schema = read_xlsx_schema(&parms_path(), "input_vals", (4, 20)).unwrap();
        assert_eq!(schema.len(), 7);
        let lions = schema.get("1").unwrap();
        assert_eq!(lions.group_id, Some("lion".to_string()));
        assert!(lions.has_checkbox);
        assert_eq!(lions.checkbox_label, "Do you have lions?");
        assert!(!lions.checkbox_default);
        assert_eq!(lions.widget_key, "101");
        assert_eq!(schema.get("5").unwrap().widget_kind, WidgetKind::Radio);
        let grumpy = schema.get("4").unwrap();
        let req = form_engine::widget_request(grumpy).unwrap();
        assert_eq!(req.default, Value::Float(2.5));
    }

    #[test]
    fn matches_the_csv_sheet() {
        let xlsx = read_xlsx_schema(&parms_path(), "input_vals", (4, 20)).unwrap();
        let csv_path = parms_path().replace("parms.xlsx", "parms.csv");
        let csv = crate::form::io_csv::read_csv_schema(&csv_path).unwrap();
        for (a, b) in xlsx.fields().iter().zip(csv.fields()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.group_id, b.group_id);
            assert_eq!(a.has_checkbox, b.has_checkbox);
            assert_eq!(a.widget_kind, b.widget_kind);
            assert_eq!(a.widget_key, b.widget_key);
            assert_eq!(
                form_engine::widget_request(a).unwrap(),
                form_engine::widget_request(b).unwrap()
            );
        }
        assert_eq!(xlsx.len(), csv.len());
    }

    #[test]
    fn missing_worksheet_lists_the_others() {
        let err = read_xlsx_schema(&parms_path(), "Form1", (4, 20)).unwrap_err();
        match err {
            AssessError::MissingWorksheet { available, .. } => {
                assert!(available.contains("input_vals"))
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn wrong_window_misses_columns() {
        let err = read_xlsx_schema(&parms_path(), "input_vals", (0, 16)).unwrap_err();
        assert!(matches!(err, AssessError::MissingColumn { .. }));
    }
}

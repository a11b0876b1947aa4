//! CSV ingestion with per-column kind inference.
//!
//! The whole file is read into memory as raw cells first; each column's kind
//! is then inferred from every non-missing cell, and the cells are converted
//! to typed [`Value`]s in a second pass. An empty cell within a record is
//! missing; a fully blank line is not a record and contributes no row (so a
//! single-column file cannot express a missing cell with a blank line).

use facets_common::{Result, error::Error};

use crate::table::{Column, Table};
use crate::value::{ColumnKind, Value};

/// Loads a headered CSV file into a [`Table`].
///
/// Ragged records (a row whose cell count differs from the header) surface as
/// a csv error naming the file; so does an unreadable path.
pub fn load_csv(path: &str) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::csv(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::csv(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = headers.iter().map(|_| Vec::new()).collect();
    for record in reader.records() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        for (i, cell) in record.iter().enumerate() {
            raw[i].push(if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| {
            let kind = infer_kind(&cells);
            let values = cells.iter().map(|c| convert_cell(c, kind)).collect();
            Column { name, kind, values }
        })
        .collect();

    let table = Table::new(columns);
    log::debug!(
        "loaded '{}': {} rows, {} columns",
        path,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// A column is numeric if every non-missing cell parses as a number, boolean
/// if every non-missing cell is `true`/`false` (ASCII case-insensitive), and
/// categorical otherwise. An all-missing column is categorical.
fn infer_kind(cells: &[Option<String>]) -> ColumnKind {
    let mut seen = false;
    let mut all_numeric = true;
    let mut all_boolean = true;
    for cell in cells.iter().flatten() {
        seen = true;
        if all_numeric && cell.trim().parse::<f64>().is_err() {
            all_numeric = false;
        }
        if all_boolean && !is_boolean_cell(cell) {
            all_boolean = false;
        }
        if !all_numeric && !all_boolean {
            break;
        }
    }
    if !seen {
        ColumnKind::Categorical
    } else if all_numeric {
        ColumnKind::Numeric
    } else if all_boolean {
        ColumnKind::Boolean
    } else {
        ColumnKind::Categorical
    }
}

fn is_boolean_cell(cell: &str) -> bool {
    let cell = cell.trim();
    cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false")
}

fn convert_cell(cell: &Option<String>, kind: ColumnKind) -> Value {
    let Some(cell) = cell else {
        return Value::Missing;
    };
    match kind {
        // Inference guarantees these parses succeed.
        ColumnKind::Numeric => cell
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or(Value::Missing),
        ColumnKind::Boolean => Value::Bool(cell.trim().eq_ignore_ascii_case("true")),
        ColumnKind::Categorical => Value::Text(cell.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_infers_kinds() {
        let file = write_csv("id,name,score,alive\n1,ada,3.5,true\n2,lin,4.0,False\n");
        let table = load_csv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("id").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(table.column("name").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(table.column("score").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(table.column("alive").unwrap().kind, ColumnKind::Boolean);
        assert_eq!(
            table.column("alive").unwrap().values,
            vec![Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let file = write_csv("v\n1\ntwo\n3\n");
        let table = load_csv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.column("v").unwrap().kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_empty_cells_are_missing_and_do_not_affect_kind() {
        let file = write_csv("id,v\n1,1\n2,\n3,3\n");
        let table = load_csv(file.path().to_str().unwrap()).unwrap();
        let column = table.column("v").unwrap();
        assert_eq!(column.kind, ColumnKind::Numeric);
        assert_eq!(
            column.values,
            vec![Value::Number(1.0), Value::Missing, Value::Number(3.0)]
        );
    }

    #[test]
    fn test_blank_lines_are_not_records() {
        let file = write_csv("v\n1\n\n3\n");
        let table = load_csv(file.path().to_str().unwrap()).unwrap();
        let column = table.column("v").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(column.values, vec![Value::Number(1.0), Value::Number(3.0)]);
    }

    #[test]
    fn test_all_missing_column_is_categorical() {
        let file = write_csv("a,b\n1,\n2,\n");
        let table = load_csv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.column("b").unwrap().kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_csv("/no/such/file.csv").unwrap_err();
        assert!(err.to_string().contains("/no/such/file.csv"));
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let file = write_csv("a,b\n1,2\n3\n");
        assert!(load_csv(file.path().to_str().unwrap()).is_err());
    }
}

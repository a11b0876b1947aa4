//! Column-major table with order-preserving filtering and group partitioning.

use facets_common::{Result, error::Error};

use crate::value::{ColumnKind, Value};

/// A named column: every cell shares the inferred [`ColumnKind`].
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

/// An ordered set of equally-long columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table from the given columns. All columns must have the same
    /// number of values.
    pub fn new(columns: Vec<Column>) -> Table {
        if let Some(first) = columns.first() {
            let len = first.values.len();
            assert!(
                columns.iter().all(|c| c.values.len() == len),
                "all table columns must have the same length"
            );
        }
        Table { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Verifies that `name` refers to an existing column.
    pub fn verify_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(Error::unknown_column(name))
        }
    }

    /// Applies a predicate expression (see [`crate::query`]) and returns the
    /// rows that satisfy it, preserving row order and all columns. An empty
    /// predicate returns the table unchanged.
    pub fn filter(&self, predicate: &str) -> Result<Table> {
        if predicate.is_empty() {
            return Ok(self.clone());
        }
        let keep = crate::query::evaluate(self, predicate)?;
        Ok(self.retain_rows(&keep))
    }

    /// Keeps the rows whose mask entry is true. `keep` must cover every row.
    pub fn retain_rows(&self, keep: &[bool]) -> Table {
        assert_eq!(keep.len(), self.row_count());
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: c
                    .values
                    .iter()
                    .zip(keep)
                    .filter(|&(_, &k)| k)
                    .map(|(v, _)| v.clone())
                    .collect(),
            })
            .collect();
        Table { columns }
    }

    fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// Removes the named column and returns it, or `None` if absent.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos))
    }

    /// Partitions the rows by the distinct display values of `group_by`, in
    /// first-occurrence order. An empty `group_by` yields one group named
    /// `"data"` covering the whole table; missing cells group under `"null"`.
    pub fn partition_by(&self, group_by: &str) -> Result<Vec<(String, Table)>> {
        if group_by.is_empty() {
            return Ok(vec![("data".to_string(), self.clone())]);
        }
        let column = self
            .column(group_by)
            .ok_or_else(|| Error::unknown_column(group_by))?;

        let mut order: Vec<String> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (row, value) in column.values.iter().enumerate() {
            let key = value.display_key();
            match order.iter().position(|k| *k == key) {
                Some(pos) => groups[pos].push(row),
                None => {
                    order.push(key);
                    groups.push(vec![row]);
                }
            }
        }

        Ok(order
            .into_iter()
            .zip(groups)
            .map(|(key, rows)| (key, self.take_rows(&rows)))
            .collect())
    }

    /// Serializes the table as an array of JSON objects, one per row, with
    /// columns in table order. Missing cells become JSON `null`; integral
    /// numbers are emitted without a fractional part.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        let mut records = Vec::with_capacity(self.row_count());
        for row in 0..self.row_count() {
            let mut record = serde_json::Map::with_capacity(self.columns.len());
            for column in &self.columns {
                record.insert(column.name.clone(), value_to_json(&column.values[row]));
            }
            records.push(record);
        }
        records
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Number(v) => {
            if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
                serde_json::Value::from(*v as i64)
            } else {
                // Non-finite numbers have no JSON representation.
                serde_json::Number::from_f64(*v)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Text(v) => serde_json::Value::String(v.clone()),
        Value::Missing => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            Column {
                name: "id".to_string(),
                kind: ColumnKind::Numeric,
                values: vec![
                    Value::Number(1.0),
                    Value::Number(2.0),
                    Value::Number(3.0),
                    Value::Number(4.0),
                ],
            },
            Column {
                name: "species".to_string(),
                kind: ColumnKind::Categorical,
                values: vec![
                    Value::Text("cat".into()),
                    Value::Text("dog".into()),
                    Value::Text("cat".into()),
                    Value::Missing,
                ],
            },
        ])
    }

    #[test]
    fn test_empty_filter_returns_table_unchanged() {
        let table = sample_table();
        let filtered = table.filter("").unwrap();
        assert_eq!(filtered.row_count(), 4);
        assert_eq!(filtered.column_count(), 2);
        assert_eq!(
            filtered.column("id").unwrap().values,
            table.column("id").unwrap().values
        );
    }

    #[test]
    fn test_partition_without_group_by_yields_single_data_group() {
        let table = sample_table();
        let groups = table.partition_by("").unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "data");
        assert_eq!(groups[0].1.row_count(), 4);
    }

    #[test]
    fn test_partition_covers_every_row_exactly_once() {
        let table = sample_table();
        let groups = table.partition_by("species").unwrap();
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["cat", "dog", "null"]);
        let total: usize = groups.iter().map(|(_, t)| t.row_count()).sum();
        assert_eq!(total, table.row_count());
    }

    #[test]
    fn test_partition_unknown_column_fails() {
        let table = sample_table();
        let err = table.partition_by("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_drop_column() {
        let mut table = sample_table();
        let dropped = table.drop_column("species").unwrap();
        assert_eq!(dropped.name, "species");
        assert_eq!(table.column_count(), 1);
        assert!(table.drop_column("species").is_none());
    }

    #[test]
    fn test_to_records() {
        let table = sample_table();
        let records = table.to_records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["id"], serde_json::json!(1));
        assert_eq!(records[0]["species"], serde_json::json!("cat"));
        assert_eq!(records[3]["species"], serde_json::Value::Null);
    }

    #[test]
    fn test_retain_rows_preserves_order() {
        let table = sample_table();
        let filtered = table.retain_rows(&[true, false, true, false]);
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(
            filtered.column("id").unwrap().values,
            vec![Value::Number(1.0), Value::Number(3.0)]
        );
    }
}

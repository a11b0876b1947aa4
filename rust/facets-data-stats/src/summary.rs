//! Builds the grouped statistics summary for a table.

use facets_common::Result;
use facets_table::{Column, ColumnKind, Table, Value};

use crate::boolean::BooleanStatsCollector;
use crate::categorical::CategoricalStatsCollector;
use crate::defs;
use crate::numeric::NumericStatsCollector;

/// Computes per-group, per-column statistics for `table`.
///
/// A non-empty `group_by` partitions the rows by that column's distinct
/// values (first-occurrence order); an empty one yields the single group
/// `"data"`. A table with zero rows yields zero groups. An unknown
/// `group_by` name is an error.
pub fn build_statistics(table: &Table, group_by: &str) -> Result<defs::FeatureStatisticsList> {
    if table.row_count() == 0 {
        if !group_by.is_empty() {
            table.verify_column(group_by)?;
        }
        return Ok(defs::FeatureStatisticsList::default());
    }

    let groups = table.partition_by(group_by)?;
    let datasets = groups
        .iter()
        .map(|(name, group)| {
            log::debug!("summarizing group '{}' ({} rows)", name, group.row_count());
            defs::DatasetFeatureStatistics {
                name: name.clone(),
                num_rows: group.row_count() as u64,
                features: group.columns().iter().map(summarize_column).collect(),
            }
        })
        .collect();

    Ok(defs::FeatureStatisticsList { datasets })
}

fn summarize_column(column: &Column) -> defs::FeatureStatistics {
    match column.kind {
        ColumnKind::Numeric => summarize_numeric(column),
        ColumnKind::Categorical => summarize_categorical(column),
        ColumnKind::Boolean => summarize_boolean(column),
    }
}

fn summarize_numeric(column: &Column) -> defs::FeatureStatistics {
    let mut collector = NumericStatsCollector::new();
    for value in &column.values {
        match value {
            Value::Number(v) => collector.process_value(*v),
            _ => collector.process_missing(),
        }
    }
    let stats = collector.finish();
    defs::FeatureStatistics {
        name: column.name.clone(),
        kind: defs::FeatureKind::Numeric as i32,
        non_missing_count: stats.count,
        missing_count: stats.missing_count,
        numeric: stats.summary.map(|s| defs::NumericStatistics {
            min: s.min,
            max: s.max,
            mean: s.mean,
            std_dev: s.std_dev,
            median: s.median,
            histogram: s
                .histogram
                .into_iter()
                .map(|b| defs::HistogramBucket {
                    low: b.low,
                    high: b.high,
                    count: b.count,
                })
                .collect(),
        }),
        categorical: None,
        boolean: None,
    }
}

fn summarize_categorical(column: &Column) -> defs::FeatureStatistics {
    let mut collector = CategoricalStatsCollector::new();
    for value in &column.values {
        match value {
            Value::Text(v) => collector.process_value(v),
            Value::Missing => collector.process_missing(),
            // A categorical column only ever holds text, but folding any
            // stray value through its display form keeps the counts honest.
            other => collector.process_value(&other.display_key()),
        }
    }
    let stats = collector.finish();
    defs::FeatureStatistics {
        name: column.name.clone(),
        kind: defs::FeatureKind::Categorical as i32,
        non_missing_count: stats.count,
        missing_count: stats.missing_count,
        numeric: None,
        categorical: Some(defs::CategoricalStatistics {
            distinct_count: stats.distinct_count,
            frequencies: to_value_frequencies(stats.frequencies),
            top_values: to_value_frequencies(stats.top_values),
        }),
        boolean: None,
    }
}

fn summarize_boolean(column: &Column) -> defs::FeatureStatistics {
    let mut collector = BooleanStatsCollector::new();
    for value in &column.values {
        match value {
            Value::Bool(v) => collector.process_value(*v),
            _ => collector.process_missing(),
        }
    }
    let stats = collector.finish();
    defs::FeatureStatistics {
        name: column.name.clone(),
        kind: defs::FeatureKind::Boolean as i32,
        non_missing_count: stats.count,
        missing_count: stats.missing_count,
        numeric: None,
        categorical: None,
        boolean: Some(defs::BooleanStatistics {
            true_count: stats.true_count,
            false_count: stats.false_count,
        }),
    }
}

fn to_value_frequencies(pairs: Vec<(String, u64)>) -> Vec<defs::ValueFrequency> {
    pairs
        .into_iter()
        .map(|(value, count)| defs::ValueFrequency { value, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facets_table::Column;
    use prost::Message;

    fn sample_table() -> Table {
        Table::new(vec![
            Column {
                name: "value".to_string(),
                kind: ColumnKind::Numeric,
                values: vec![
                    Value::Number(1.0),
                    Value::Number(2.0),
                    Value::Number(3.0),
                    Value::Number(4.0),
                    Value::Number(5.0),
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
                    Value::Text("cat".into()),
                ],
            },
            Column {
                name: "alive".to_string(),
                kind: ColumnKind::Boolean,
                values: vec![
                    Value::Bool(true),
                    Value::Bool(false),
                    Value::Bool(true),
                    Value::Bool(true),
                    Value::Missing,
                ],
            },
        ])
    }

    #[test]
    fn test_single_data_group_without_group_by() {
        let list = build_statistics(&sample_table(), "").unwrap();
        assert_eq!(list.datasets.len(), 1);
        assert_eq!(list.datasets[0].name, "data");
        assert_eq!(list.datasets[0].num_rows, 5);
        assert_eq!(list.datasets[0].features.len(), 3);
    }

    #[test]
    fn test_numeric_feature_values() {
        let list = build_statistics(&sample_table(), "").unwrap();
        let feature = &list.datasets[0].features[0];
        assert_eq!(feature.name, "value");
        assert_eq!(feature.kind, defs::FeatureKind::Numeric as i32);
        let numeric = feature.numeric.as_ref().unwrap();
        assert_eq!(numeric.min, 1.0);
        assert_eq!(numeric.max, 5.0);
        assert_eq!(numeric.mean, 3.0);
        assert_eq!(numeric.median, 3.0);
    }

    #[test]
    fn test_categorical_frequencies_sum() {
        let list = build_statistics(&sample_table(), "").unwrap();
        let feature = &list.datasets[0].features[1];
        let categorical = feature.categorical.as_ref().unwrap();
        let total: u64 = categorical.frequencies.iter().map(|f| f.count).sum();
        assert_eq!(total, feature.non_missing_count);
        assert_eq!(feature.missing_count, 1);
        assert_eq!(categorical.top_values[0].value, "cat");
    }

    #[test]
    fn test_boolean_feature_counts() {
        let list = build_statistics(&sample_table(), "").unwrap();
        let feature = &list.datasets[0].features[2];
        let boolean = feature.boolean.as_ref().unwrap();
        assert_eq!(boolean.true_count, 3);
        assert_eq!(boolean.false_count, 1);
        assert_eq!(feature.missing_count, 1);
    }

    #[test]
    fn test_grouped_rows_cover_the_table() {
        let list = build_statistics(&sample_table(), "species").unwrap();
        let names: Vec<&str> = list.datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["cat", "dog", "null"]);
        let total: u64 = list.datasets.iter().map(|d| d.num_rows).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_unknown_group_by_fails() {
        let err = build_statistics(&sample_table(), "nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_empty_table_yields_zero_groups() {
        let table = Table::new(vec![Column {
            name: "value".to_string(),
            kind: ColumnKind::Numeric,
            values: vec![],
        }]);
        let list = build_statistics(&table, "").unwrap();
        assert!(list.datasets.is_empty());
    }

    #[test]
    fn test_summary_round_trips_through_the_wire_format() {
        let list = build_statistics(&sample_table(), "species").unwrap();
        let buf = list.encode_to_vec();
        let decoded = defs::FeatureStatisticsList::decode(buf.as_slice()).unwrap();
        assert_eq!(decoded, list);
    }
}

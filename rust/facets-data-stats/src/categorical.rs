//! Categorical (string) statistics collection: a full value-to-frequency
//! mapping in first-occurrence order, plus the top-K most frequent values.

use std::collections::HashMap;

/// Number of most-frequent values reported in `top_values`.
pub const TOP_K: usize = 20;

/// A struct to collect statistics for categorical columns.
#[derive(Debug, Default)]
pub struct CategoricalStatsCollector {
    /// Value -> index into `frequencies`, to keep lookups O(1) while the
    /// vector preserves first-occurrence order.
    index: HashMap<String, usize>,
    frequencies: Vec<(String, u64)>,
    count: u64,
    missing_count: u64,
}

impl CategoricalStatsCollector {
    /// Creates a new `CategoricalStatsCollector`.
    pub fn new() -> CategoricalStatsCollector {
        CategoricalStatsCollector::default()
    }

    /// Processes a single non-missing value.
    pub fn process_value(&mut self, value: &str) {
        self.count += 1;
        match self.index.get(value) {
            Some(&pos) => self.frequencies[pos].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.frequencies.len());
                self.frequencies.push((value.to_string(), 1));
            }
        }
    }

    /// Processes a missing cell.
    pub fn process_missing(&mut self) {
        self.missing_count += 1;
    }

    /// Finalizes the collection and returns the collected statistics.
    pub fn finish(self) -> CategoricalStats {
        let mut top_values = self.frequencies.clone();
        // Stable sort keeps first-occurrence order among equal frequencies.
        top_values.sort_by(|a, b| b.1.cmp(&a.1));
        top_values.truncate(TOP_K);

        CategoricalStats {
            count: self.count,
            missing_count: self.missing_count,
            distinct_count: self.frequencies.len() as u64,
            frequencies: self.frequencies,
            top_values,
        }
    }
}

/// The collected statistics for one categorical column.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalStats {
    /// Number of non-missing values.
    pub count: u64,
    pub missing_count: u64,
    pub distinct_count: u64,
    pub frequencies: Vec<(String, u64)>,
    pub top_values: Vec<(String, u64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequencies_sum_to_non_missing_count() {
        let mut collector = CategoricalStatsCollector::new();
        for value in ["cat", "dog", "cat", "bird", "cat", "dog"] {
            collector.process_value(value);
        }
        collector.process_missing();
        let stats = collector.finish();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.missing_count, 1);
        assert_eq!(stats.distinct_count, 3);
        let total: u64 = stats.frequencies.iter().map(|(_, c)| c).sum();
        assert_eq!(total, stats.count);
    }

    #[test]
    fn test_frequencies_keep_first_occurrence_order() {
        let mut collector = CategoricalStatsCollector::new();
        for value in ["b", "a", "b", "c"] {
            collector.process_value(value);
        }
        let stats = collector.finish();
        let order: Vec<&str> = stats.frequencies.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_top_values_order_and_tie_breaking() {
        let mut collector = CategoricalStatsCollector::new();
        for value in ["x", "y", "z", "y", "z", "x", "z"] {
            collector.process_value(value);
        }
        let stats = collector.finish();
        // z: 3, then x and y tied at 2 in first-occurrence order.
        let order: Vec<&str> = stats.top_values.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_top_values_truncated_to_k() {
        let mut collector = CategoricalStatsCollector::new();
        for i in 0..(TOP_K + 5) {
            collector.process_value(&format!("value-{i}"));
        }
        let stats = collector.finish();
        assert_eq!(stats.distinct_count as usize, TOP_K + 5);
        assert_eq!(stats.frequencies.len(), TOP_K + 5);
        assert_eq!(stats.top_values.len(), TOP_K);
    }

    #[test]
    fn test_empty_collector() {
        let stats = CategoricalStatsCollector::new().finish();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.distinct_count, 0);
        assert!(stats.frequencies.is_empty());
        assert!(stats.top_values.is_empty());
    }
}

//! Numeric statistics collection.
//!
//! The collector buffers every finite value (median and histogram need the
//! full sample anyway, and the whole table is in memory by design), then
//! computes min/max/mean, the population standard deviation, the median and
//! a fixed-width histogram in `finish`.

/// Number of equal-width histogram buckets between min and max.
pub const HISTOGRAM_BUCKETS: usize = 10;

/// A struct to collect statistics for numeric columns.
#[derive(Debug, Default)]
pub struct NumericStatsCollector {
    values: Vec<f64>,
    missing_count: u64,
}

impl NumericStatsCollector {
    /// Creates a new `NumericStatsCollector`.
    pub fn new() -> NumericStatsCollector {
        NumericStatsCollector::default()
    }

    /// Processes a single numeric value. NaN counts as missing, since no
    /// ordered statistic is defined for it.
    pub fn process_value(&mut self, value: f64) {
        if value.is_nan() {
            self.missing_count += 1;
        } else {
            self.values.push(value);
        }
    }

    /// Processes a missing cell.
    pub fn process_missing(&mut self) {
        self.missing_count += 1;
    }

    /// Finalizes the collection and returns the collected statistics.
    /// `summary` is `None` when no non-missing value was seen.
    pub fn finish(mut self) -> NumericStats {
        if self.values.is_empty() {
            return NumericStats {
                count: 0,
                missing_count: self.missing_count,
                summary: None,
            };
        }

        self.values.sort_by(f64::total_cmp);
        let count = self.values.len();
        let min = self.values[0];
        let max = self.values[count - 1];
        let mean = self.values.iter().sum::<f64>() / count as f64;
        let variance = self
            .values
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / count as f64;
        let median = if count % 2 == 1 {
            self.values[count / 2]
        } else {
            (self.values[count / 2 - 1] + self.values[count / 2]) / 2.0
        };

        NumericStats {
            count: count as u64,
            missing_count: self.missing_count,
            summary: Some(NumericSummary {
                min,
                max,
                mean,
                std_dev: variance.sqrt(),
                median,
                histogram: build_histogram(&self.values, min, max),
            }),
        }
    }
}

/// Buckets a sorted sample into [`HISTOGRAM_BUCKETS`] equal-width buckets
/// over `[min, max]`. The final bucket is closed, so a value equal to `max`
/// lands in the last bucket; a degenerate `min == max` sample lands entirely
/// in bucket 0.
fn build_histogram(values: &[f64], min: f64, max: f64) -> Vec<Bucket> {
    let width = (max - min) / HISTOGRAM_BUCKETS as f64;
    let mut buckets: Vec<Bucket> = (0..HISTOGRAM_BUCKETS)
        .map(|i| Bucket {
            low: min + width * i as f64,
            high: if i == HISTOGRAM_BUCKETS - 1 {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for &value in values {
        let index = if width == 0.0 {
            0
        } else {
            (((value - min) / width) as usize).min(HISTOGRAM_BUCKETS - 1)
        };
        buckets[index].count += 1;
    }
    buckets
}

/// The collected statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericStats {
    /// Number of non-missing values.
    pub count: u64,
    pub missing_count: u64,
    pub summary: Option<NumericSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (`sqrt(sum((x - mean)^2) / n)`).
    pub std_dev: f64,
    pub median: f64,
    pub histogram: Vec<Bucket>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub low: f64,
    pub high: f64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(values: &[f64]) -> NumericStats {
        let mut collector = NumericStatsCollector::new();
        for &v in values {
            collector.process_value(v);
        }
        collector.finish()
    }

    #[test]
    fn test_one_to_five() {
        let stats = collect(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.missing_count, 0);
        let summary = stats.summary.unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.median, 3.0);
        assert!((summary.std_dev - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_even_count_median_averages_middle_values() {
        let stats = collect(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.summary.unwrap().median, 2.5);
    }

    #[test]
    fn test_histogram_buckets() {
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let stats = collect(&values);
        let summary = stats.summary.unwrap();
        assert_eq!(summary.histogram.len(), HISTOGRAM_BUCKETS);
        assert_eq!(summary.histogram[0].low, 0.0);
        assert_eq!(summary.histogram[9].high, 10.0);
        // Every value in exactly one bucket; 10.0 lands in the closed last one.
        let total: u64 = summary.histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, 11);
        assert_eq!(summary.histogram[9].count, 2); // 9.0 and 10.0
    }

    #[test]
    fn test_single_valued_column() {
        let stats = collect(&[7.0, 7.0, 7.0]);
        let summary = stats.summary.unwrap();
        assert_eq!(summary.min, 7.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.histogram[0].count, 3);
        assert!(summary.histogram[1..].iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_missing_and_nan_are_counted_but_excluded() {
        let mut collector = NumericStatsCollector::new();
        collector.process_value(1.0);
        collector.process_missing();
        collector.process_value(f64::NAN);
        collector.process_value(3.0);
        let stats = collector.finish();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.missing_count, 2);
        assert_eq!(stats.summary.unwrap().mean, 2.0);
    }

    #[test]
    fn test_all_missing_has_no_summary() {
        let mut collector = NumericStatsCollector::new();
        collector.process_missing();
        collector.process_missing();
        let stats = collector.finish();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.missing_count, 2);
        assert!(stats.summary.is_none());
    }
}

//! Boolean statistics collection: true/false/missing counts.

/// A struct to collect statistics for boolean columns.
#[derive(Debug, Default)]
pub struct BooleanStatsCollector {
    count: u64,
    missing_count: u64,
    true_count: u64,
    false_count: u64,
}

impl BooleanStatsCollector {
    /// Creates a new `BooleanStatsCollector`.
    pub fn new() -> BooleanStatsCollector {
        BooleanStatsCollector::default()
    }

    /// Processes a single non-missing value.
    pub fn process_value(&mut self, value: bool) {
        self.count += 1;
        if value {
            self.true_count += 1;
        } else {
            self.false_count += 1;
        }
    }

    /// Processes a missing cell.
    pub fn process_missing(&mut self) {
        self.missing_count += 1;
    }

    /// Finalizes the collection and returns the collected statistics.
    pub fn finish(self) -> BooleanStats {
        assert_eq!(
            self.true_count + self.false_count,
            self.count,
            "boolean statistics counts are inconsistent"
        );
        BooleanStats {
            count: self.count,
            missing_count: self.missing_count,
            true_count: self.true_count,
            false_count: self.false_count,
        }
    }
}

/// The collected statistics for one boolean column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanStats {
    /// Number of non-missing values.
    pub count: u64,
    pub missing_count: u64,
    pub true_count: u64,
    pub false_count: u64,
}

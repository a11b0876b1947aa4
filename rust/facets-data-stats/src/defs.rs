//! Wire definitions for the serialized statistics summary.
//!
//! These are hand-maintained prost messages; the encoded
//! [`FeatureStatisticsList`] is what gets base64-embedded into the rendered
//! page. The layout is a nested mapping (dataset name, then feature name) so
//! a consumer can locate all features of a named group without decoding
//! anything beyond the envelope of interest.

/// Root of the summary: one entry per group ("dataset").
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureStatisticsList {
    #[prost(message, repeated, tag = "1")]
    pub datasets: ::prost::alloc::vec::Vec<DatasetFeatureStatistics>,
}

/// Statistics for all features of one row group.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DatasetFeatureStatistics {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub num_rows: u64,
    #[prost(message, repeated, tag = "3")]
    pub features: ::prost::alloc::vec::Vec<FeatureStatistics>,
}

/// Per-column summary: kind tag, presence counts, and exactly one of the
/// kind-specific payloads populated.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureStatistics {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "FeatureKind", tag = "2")]
    pub kind: i32,
    #[prost(uint64, tag = "3")]
    pub non_missing_count: u64,
    #[prost(uint64, tag = "4")]
    pub missing_count: u64,
    #[prost(message, optional, tag = "5")]
    pub numeric: ::core::option::Option<NumericStatistics>,
    #[prost(message, optional, tag = "6")]
    pub categorical: ::core::option::Option<CategoricalStatistics>,
    #[prost(message, optional, tag = "7")]
    pub boolean: ::core::option::Option<BooleanStatistics>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FeatureKind {
    Numeric = 0,
    Categorical = 1,
    Boolean = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NumericStatistics {
    #[prost(double, tag = "1")]
    pub min: f64,
    #[prost(double, tag = "2")]
    pub max: f64,
    #[prost(double, tag = "3")]
    pub mean: f64,
    /// Population standard deviation.
    #[prost(double, tag = "4")]
    pub std_dev: f64,
    #[prost(double, tag = "5")]
    pub median: f64,
    /// Ten equal-width buckets over `[min, max]`; the last bucket is closed.
    #[prost(message, repeated, tag = "6")]
    pub histogram: ::prost::alloc::vec::Vec<HistogramBucket>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistogramBucket {
    #[prost(double, tag = "1")]
    pub low: f64,
    #[prost(double, tag = "2")]
    pub high: f64,
    #[prost(uint64, tag = "3")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CategoricalStatistics {
    #[prost(uint64, tag = "1")]
    pub distinct_count: u64,
    /// Full value-to-occurrence mapping, in first-occurrence order.
    #[prost(message, repeated, tag = "2")]
    pub frequencies: ::prost::alloc::vec::Vec<ValueFrequency>,
    /// The most frequent values (at most 20), by descending frequency, ties
    /// broken by first occurrence.
    #[prost(message, repeated, tag = "3")]
    pub top_values: ::prost::alloc::vec::Vec<ValueFrequency>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueFrequency {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BooleanStatistics {
    #[prost(uint64, tag = "1")]
    pub true_count: u64,
    #[prost(uint64, tag = "2")]
    pub false_count: u64,
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;

    #[test]
    fn test_basic_proto_serialization() {
        let list = FeatureStatisticsList {
            datasets: vec![DatasetFeatureStatistics {
                name: "data".into(),
                num_rows: 2,
                features: vec![FeatureStatistics {
                    name: "value".into(),
                    kind: FeatureKind::Numeric as i32,
                    non_missing_count: 2,
                    missing_count: 0,
                    numeric: Some(NumericStatistics {
                        min: 1.0,
                        max: 2.0,
                        mean: 1.5,
                        std_dev: 0.5,
                        median: 1.5,
                        histogram: vec![HistogramBucket {
                            low: 1.0,
                            high: 2.0,
                            count: 2,
                        }],
                    }),
                    categorical: None,
                    boolean: None,
                }],
            }],
        };

        let buf = list.encode_to_vec();
        let decoded = FeatureStatisticsList::decode(buf.as_slice()).unwrap();
        assert_eq!(decoded, list);
        assert_eq!(decoded.datasets[0].name, "data");
        assert_eq!(
            decoded.datasets[0].features[0].numeric.as_ref().unwrap().mean,
            1.5
        );
    }
}

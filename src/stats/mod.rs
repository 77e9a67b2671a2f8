//! Percentile utility and the grouped aggregation engine

mod aggregate;
pub mod percentile;

pub use aggregate::{aggregate, aggregate_column, threat_counts, Field, GroupBy, GroupKey, Stats};
pub use percentile::{percentile, percentile_sorted};

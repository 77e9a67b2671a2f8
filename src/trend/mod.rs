//! Year-over-year trend engine

mod engine;
pub mod partition;

pub use engine::{yearly_delta, PartitionKey, TrendGrouping, YearRecord};
pub use partition::{lagged, Lagged, OrderedPartitions};

//! Error type shared by the loader and every analytics component

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// An aggregate was requested over a group with no values
    #[error("no data to aggregate for field '{field}'")]
    NoData { field: String },

    #[error("percentile detection needs at least {required} distinct groups, found {found}")]
    InsufficientGroups { found: usize, required: usize },

    #[error("cannot aggregate on field '{name}': {reason}")]
    InvalidField { name: String, reason: String },

    #[error("percentile {0} is outside [0, 1]")]
    InvalidPercentile(f64),

    #[error("invalid claim record '{policy_number}': {reason}")]
    InvalidRecord { policy_number: String, reason: String },

    #[error("duplicate policy number '{0}'")]
    DuplicatePolicy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

//! Claims Analytics - anomaly and trend engine for cyber-insurance claims
//!
//! This library provides:
//! - Threat classification from incident descriptions
//! - Grouped descriptive statistics with continuous percentiles
//! - Reported-vs-verified loss discrepancy outlier flags
//! - Year-over-year claim count and payout deltas
//! - High-severity company selection

pub mod claim;
pub mod config;
pub mod discrepancy;
pub mod error;
pub mod runner;
pub mod severity;
pub mod stats;
pub mod threat;
pub mod trend;

// Re-export commonly used types
pub use claim::{Claim, ClassifiedClaim};
pub use config::AnalysisConfig;
pub use discrepancy::{detect, CompanyDiscrepancy, DetectMode, DiscrepancyDetector};
pub use error::{AnalyticsError, Result};
pub use runner::{AnalysisReport, AnalyticsRunner};
pub use stats::{aggregate, Field, GroupBy, Stats};
pub use threat::{classify, ThreatType};
pub use trend::{yearly_delta, TrendGrouping, YearRecord};

//! Analysis run configuration

use crate::discrepancy::{DEFAULT_DETECTION_LIMIT, DEFAULT_LOWER_PERCENTILE, DEFAULT_UPPER_PERCENTILE};
use crate::error::{AnalyticsError, Result};
use crate::severity::{SeverityBasis, DEFAULT_SEVERITY_PERCENTILE};
use crate::stats::{Field, GroupBy};
use crate::trend::TrendGrouping;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Parameters for a full analytics run; every field has a default so a
/// partial JSON document is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Maximum companies returned per discrepancy direction (default: 10)
    #[serde(default = "default_detection_limit")]
    pub detection_limit: usize,

    /// Overstatement threshold percentile (default: 0.90)
    #[serde(default = "default_upper_percentile")]
    pub upper_percentile: f64,

    /// Understatement threshold percentile (default: 0.10)
    #[serde(default = "default_lower_percentile")]
    pub lower_percentile: f64,

    /// High-severity threshold percentile (default: 0.95)
    #[serde(default = "default_severity_percentile")]
    pub severity_percentile: f64,

    #[serde(default)]
    pub severity_basis: SeverityBasis,

    #[serde(default = "default_severity_field")]
    pub severity_field: Field,

    #[serde(default = "default_trend_grouping")]
    pub trend_grouping: TrendGrouping,

    #[serde(default = "default_aggregate_field")]
    pub aggregate_field: Field,

    #[serde(default = "default_aggregate_by")]
    pub aggregate_by: GroupBy,
}

fn default_detection_limit() -> usize { DEFAULT_DETECTION_LIMIT }
fn default_upper_percentile() -> f64 { DEFAULT_UPPER_PERCENTILE }
fn default_lower_percentile() -> f64 { DEFAULT_LOWER_PERCENTILE }
fn default_severity_percentile() -> f64 { DEFAULT_SEVERITY_PERCENTILE }
fn default_severity_field() -> Field { Field::IncurredLoss }
fn default_trend_grouping() -> TrendGrouping { TrendGrouping::CompanyThreat }
fn default_aggregate_field() -> Field { Field::FinalPayout }
fn default_aggregate_by() -> GroupBy { GroupBy::ThreatType }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detection_limit: default_detection_limit(),
            upper_percentile: default_upper_percentile(),
            lower_percentile: default_lower_percentile(),
            severity_percentile: default_severity_percentile(),
            severity_basis: SeverityBasis::default(),
            severity_field: default_severity_field(),
            trend_grouping: default_trend_grouping(),
            aggregate_field: default_aggregate_field(),
            aggregate_by: default_aggregate_by(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a JSON configuration file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for p in [self.upper_percentile, self.lower_percentile, self.severity_percentile] {
            if !(0.0..=1.0).contains(&p) {
                return Err(AnalyticsError::InvalidPercentile(p));
            }
        }
        if self.lower_percentile > self.upper_percentile {
            return Err(AnalyticsError::InvalidConfig(format!(
                "lower_percentile {} exceeds upper_percentile {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        Ok(())
    }
}

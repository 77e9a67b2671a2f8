//! Pipeline runner for a loaded claims dataset
//!
//! Classifies the dataset once, then runs any number of analyses against
//! the same immutable claims.

use crate::claim::{classify_claims, Claim, ClassifiedClaim};
use crate::config::AnalysisConfig;
use crate::discrepancy::{CompanyDiscrepancy, DetectMode, DiscrepancyDetector, Thresholds};
use crate::error::Result;
use crate::severity::{high_severity_companies, SeverityFlag};
use crate::stats::{aggregate, threat_counts, Field, GroupBy, GroupKey, Stats};
use crate::threat::ThreatType;
use crate::trend::{yearly_delta, TrendGrouping, YearRecord};
use log::info;
use serde::Serialize;

/// One row of a grouped statistics table
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    pub key: GroupKey,
    pub stats: Stats,
}

/// Every engine output for one run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub claim_count: usize,
    pub company_count: usize,
    pub threat_counts: Vec<(ThreatType, usize)>,
    pub aggregate_field: Field,
    pub aggregate_by: GroupBy,
    pub aggregates: Vec<GroupStats>,
    /// `None` when fewer than two companies are present
    pub discrepancy_thresholds: Option<Thresholds>,
    pub overstatement: Vec<CompanyDiscrepancy>,
    pub understatement: Vec<CompanyDiscrepancy>,
    pub high_severity: Vec<SeverityFlag>,
    pub trend_grouping: TrendGrouping,
    pub trend: Vec<YearRecord>,
}

/// Classified dataset plus the configuration to analyse it with
#[derive(Debug, Clone)]
pub struct AnalyticsRunner {
    claims: Vec<ClassifiedClaim>,
    config: AnalysisConfig,
}

impl AnalyticsRunner {
    /// Classify `claims` and validate `config`
    pub fn new(claims: Vec<Claim>, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            claims: classify_claims(claims),
            config,
        })
    }

    pub fn with_defaults(claims: Vec<Claim>) -> Result<Self> {
        Self::new(claims, AnalysisConfig::default())
    }

    pub fn claims(&self) -> &[ClassifiedClaim] {
        &self.claims
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    pub fn aggregate(&self, group_by: GroupBy, field: Field) -> Result<Vec<GroupStats>> {
        Ok(aggregate(&self.claims, group_by, field)?
            .into_iter()
            .map(|(key, stats)| GroupStats { key, stats })
            .collect())
    }

    pub fn detector(&self) -> Result<DiscrepancyDetector> {
        DiscrepancyDetector::with_percentiles(
            &self.claims,
            self.config.lower_percentile,
            self.config.upper_percentile,
        )
    }

    pub fn detect(&self, mode: DetectMode) -> Result<Vec<CompanyDiscrepancy>> {
        Ok(self.detector()?.flag(mode, self.config.detection_limit))
    }

    pub fn high_severity(&self) -> Result<Vec<SeverityFlag>> {
        high_severity_companies(
            &self.claims,
            self.config.severity_field,
            self.config.severity_percentile,
            self.config.severity_basis,
        )
    }

    pub fn trend(&self, grouping: TrendGrouping) -> Vec<YearRecord> {
        yearly_delta(&self.claims, grouping)
    }

    /// Run every analysis with the configured parameters
    pub fn run(&self) -> Result<AnalysisReport> {
        let config = &self.config;
        let detector = self.detector()?;

        let aggregates = if self.claims.is_empty() {
            Vec::new()
        } else {
            self.aggregate(config.aggregate_by, config.aggregate_field)?
        };

        let report = AnalysisReport {
            claim_count: self.claims.len(),
            company_count: detector.scores().len(),
            threat_counts: threat_counts(&self.claims),
            aggregate_field: config.aggregate_field,
            aggregate_by: config.aggregate_by,
            aggregates,
            discrepancy_thresholds: detector.thresholds().copied(),
            overstatement: detector.flag(DetectMode::Overstatement, config.detection_limit),
            understatement: detector.flag(DetectMode::Understatement, config.detection_limit),
            high_severity: self.high_severity()?,
            trend_grouping: config.trend_grouping,
            trend: self.trend(config.trend_grouping),
        };

        info!(
            "Analysed {} claims across {} companies: {} overstating, {} understating, {} high severity",
            report.claim_count,
            report.company_count,
            report.overstatement.len(),
            report.understatement.len(),
            report.high_severity.len()
        );
        Ok(report)
    }
}

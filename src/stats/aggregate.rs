//! Grouped descriptive statistics over claim fields

use super::percentile::{percentile_sorted, sort_values};
use crate::claim::ClassifiedClaim;
use crate::error::{AnalyticsError, Result};
use crate::threat::ThreatType;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric claim field that can be aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    IncurredLoss,
    VerifiedLoss,
    /// Incurred minus verified loss
    Discrepancy,
    Deductible,
    CoverageLimit,
    CoveragePercentage,
    FinalPayout,
}

impl Field {
    pub fn value(&self, claim: &ClassifiedClaim) -> f64 {
        let c = &claim.claim;
        match self {
            Field::IncurredLoss => c.incurred_loss_amount,
            Field::VerifiedLoss => c.verified_incurred_loss_amount,
            Field::Discrepancy => c.discrepancy(),
            Field::Deductible => c.deductible,
            Field::CoverageLimit => c.coverage_limit,
            Field::CoveragePercentage => c.coverage_percentage,
            Field::FinalPayout => c.final_payout,
        }
    }

    /// Column name in the claims table
    pub fn column(&self) -> &'static str {
        match self {
            Field::IncurredLoss => "incurred_loss_amount",
            Field::VerifiedLoss => "verified_incurred_loss_amount",
            Field::Discrepancy => "discrepancy",
            Field::Deductible => "deductible",
            Field::CoverageLimit => "coverage_limit",
            Field::CoveragePercentage => "coverage_percentage",
            Field::FinalPayout => "final_payout",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let field = match s.trim() {
            "incurred_loss_amount" | "incurred_loss" => Field::IncurredLoss,
            "verified_incurred_loss_amount" | "verified_loss" => Field::VerifiedLoss,
            "discrepancy" => Field::Discrepancy,
            "deductible" => Field::Deductible,
            "coverage_limit" => Field::CoverageLimit,
            "coverage_percentage" => Field::CoveragePercentage,
            "final_payout" => Field::FinalPayout,
            "policy_number" | "company_name" | "date_of_incident" | "description_of_incident"
            | "threat_type" => {
                return Err(AnalyticsError::InvalidField {
                    name: s.to_string(),
                    reason: "non-numeric".to_string(),
                })
            }
            other => {
                return Err(AnalyticsError::InvalidField {
                    name: other.to_string(),
                    reason: "unknown field".to_string(),
                })
            }
        };
        Ok(field)
    }
}

/// Grouping dimensions for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Company,
    ThreatType,
    Year,
    CompanyThreat,
    CompanyYear,
    ThreatYear,
    CompanyThreatYear,
}

impl GroupBy {
    fn dimensions(&self) -> (bool, bool, bool) {
        match self {
            GroupBy::Company => (true, false, false),
            GroupBy::ThreatType => (false, true, false),
            GroupBy::Year => (false, false, true),
            GroupBy::CompanyThreat => (true, true, false),
            GroupBy::CompanyYear => (true, false, true),
            GroupBy::ThreatYear => (false, true, true),
            GroupBy::CompanyThreatYear => (true, true, true),
        }
    }

    /// Project a claim onto this grouping
    pub fn key(&self, claim: &ClassifiedClaim) -> GroupKey {
        let (company, threat, year) = self.dimensions();
        GroupKey {
            company: company.then(|| claim.company().to_string()),
            threat_type: threat.then_some(claim.threat_type),
            year: year.then(|| claim.year()),
        }
    }
}

/// Group identity; dimensions not part of the grouping are `None`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub company: Option<String>,
    pub threat_type: Option<ThreatType>,
    pub year: Option<i32>,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(company) = &self.company {
            parts.push(company.clone());
        }
        if let Some(threat) = self.threat_type {
            parts.push(threat.to_string());
        }
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        if parts.is_empty() {
            f.write_str("all")
        } else {
            f.write_str(&parts.join(" / "))
        }
    }
}

/// Descriptive statistics for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
    pub p95: f64,
}

impl Stats {
    /// Compute statistics for a group; an empty group has none
    pub fn from_values(mut values: Vec<f64>, field: Field) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalyticsError::NoData {
                field: field.column().to_string(),
            });
        }
        sort_values(&mut values);

        let count = values.len();
        let sum: f64 = values.iter().sum();
        Ok(Self {
            count,
            sum,
            mean: sum / count as f64,
            min: values[0],
            max: values[count - 1],
            median: percentile_sorted(&values, 0.5)?,
            p10: percentile_sorted(&values, 0.10)?,
            p90: percentile_sorted(&values, 0.90)?,
            p95: percentile_sorted(&values, 0.95)?,
        })
    }
}

/// Group claims and compute statistics of `field` per group
pub fn aggregate(
    claims: &[ClassifiedClaim],
    group_by: GroupBy,
    field: Field,
) -> Result<BTreeMap<GroupKey, Stats>> {
    if claims.is_empty() {
        return Err(AnalyticsError::NoData {
            field: field.column().to_string(),
        });
    }

    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for claim in claims {
        groups
            .entry(group_by.key(claim))
            .or_default()
            .push(field.value(claim));
    }
    debug!("Aggregating {} over {} groups ({:?})", field, groups.len(), group_by);

    // Groups are disjoint, so each one can be summarised independently
    groups
        .into_par_iter()
        .map(|(key, values)| Stats::from_values(values, field).map(|stats| (key, stats)))
        .collect()
}

/// Same as [`aggregate`] with the field given by column name
pub fn aggregate_column(
    claims: &[ClassifiedClaim],
    group_by: GroupBy,
    column: &str,
) -> Result<BTreeMap<GroupKey, Stats>> {
    aggregate(claims, group_by, column.parse()?)
}

/// Claim counts per threat type, in priority order, including zero counts
pub fn threat_counts(claims: &[ClassifiedClaim]) -> Vec<(ThreatType, usize)> {
    ThreatType::ALL
        .iter()
        .map(|&threat| {
            let count = claims.iter().filter(|c| c.threat_type == threat).count();
            (threat, count)
        })
        .collect()
}

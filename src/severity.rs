//! High-severity companies: median loss above a high percentile

use crate::claim::ClassifiedClaim;
use crate::error::Result;
use crate::stats::percentile::{percentile_sorted, sort_values};
use crate::stats::Field;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SEVERITY_PERCENTILE: f64 = 0.95;

/// Population the severity threshold is taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBasis {
    /// Every individual claim value. Compares a company median against a
    /// claim-level percentile, which reproduces the legacy report figures.
    AllClaims,
    /// The company medians themselves
    #[default]
    CompanyMedians,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityFlag {
    pub company_name: String,
    pub median: f64,
    pub claim_count: usize,
    pub threshold: f64,
}

/// Companies whose median `field` strictly exceeds the `percentile`
/// threshold, largest median first
pub fn high_severity_companies(
    claims: &[ClassifiedClaim],
    field: Field,
    percentile: f64,
    basis: SeverityBasis,
) -> Result<Vec<SeverityFlag>> {
    if claims.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_company: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for claim in claims {
        by_company.entry(claim.company()).or_default().push(field.value(claim));
    }

    let mut medians = Vec::with_capacity(by_company.len());
    for (company, mut values) in by_company {
        sort_values(&mut values);
        medians.push((company, percentile_sorted(&values, 0.5)?, values.len()));
    }

    let mut population: Vec<f64> = match basis {
        SeverityBasis::AllClaims => claims.iter().map(|c| field.value(c)).collect(),
        SeverityBasis::CompanyMedians => medians.iter().map(|m| m.1).collect(),
    };
    sort_values(&mut population);
    let threshold = percentile_sorted(&population, percentile)?;
    debug!("Severity threshold for {} ({:?}): {:.2}", field, basis, threshold);

    let mut flags: Vec<SeverityFlag> = medians
        .into_iter()
        .filter(|(_, median, _)| *median > threshold)
        .map(|(company, median, claim_count)| SeverityFlag {
            company_name: company.to_string(),
            median,
            claim_count,
            threshold,
        })
        .collect();
    flags.sort_by(|a, b| {
        b.median
            .total_cmp(&a.median)
            .then_with(|| a.company_name.cmp(&b.company_name))
    });
    Ok(flags)
}

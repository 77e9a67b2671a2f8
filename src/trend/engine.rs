//! Year-over-year claim count and payout deltas

use super::partition::OrderedPartitions;
use crate::claim::ClassifiedClaim;
use crate::threat::ThreatType;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partitioning of the yearly series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGrouping {
    /// One series over all claims
    Global,
    /// One series per company
    Company,
    /// One series per (company, threat type)
    CompanyThreat,
}

impl TrendGrouping {
    fn partition_key(&self, claim: &ClassifiedClaim) -> PartitionKey {
        match self {
            TrendGrouping::Global => PartitionKey::default(),
            TrendGrouping::Company => PartitionKey {
                company: Some(claim.company().to_string()),
                threat_type: None,
            },
            TrendGrouping::CompanyThreat => PartitionKey {
                company: Some(claim.company().to_string()),
                threat_type: Some(claim.threat_type),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PartitionKey {
    pub company: Option<String>,
    pub threat_type: Option<ThreatType>,
}

/// Totals for one observed year of one partition
#[derive(Debug, Clone, Copy, PartialEq)]
struct YearTotals {
    year: i32,
    claim_count: usize,
    total_payout: f64,
}

impl YearTotals {
    fn avg_payout(&self) -> f64 {
        self.total_payout / self.claim_count as f64
    }
}

/// One observed year within a partition, compared with the previous
/// observed year of the same partition. Previous/delta fields are `None`
/// for the first year of every partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRecord {
    pub company: Option<String>,
    pub threat_type: Option<ThreatType>,
    pub year: i32,
    pub claim_count: usize,
    pub total_payout: f64,
    pub avg_payout: f64,
    pub prev_year: Option<i32>,
    pub prev_claim_count: Option<usize>,
    pub claim_count_delta: Option<i64>,
    pub prev_total_payout: Option<f64>,
    pub total_payout_delta: Option<f64>,
    pub prev_avg_payout: Option<f64>,
    pub avg_payout_delta: Option<f64>,
}

impl YearRecord {
    fn new(key: &PartitionKey, current: &YearTotals, previous: Option<&YearTotals>) -> Self {
        let avg_payout = current.avg_payout();
        let prev_avg = previous.map(YearTotals::avg_payout);
        Self {
            company: key.company.clone(),
            threat_type: key.threat_type,
            year: current.year,
            claim_count: current.claim_count,
            total_payout: current.total_payout,
            avg_payout,
            prev_year: previous.map(|p| p.year),
            prev_claim_count: previous.map(|p| p.claim_count),
            claim_count_delta: previous
                .map(|p| current.claim_count as i64 - p.claim_count as i64),
            prev_total_payout: previous.map(|p| p.total_payout),
            total_payout_delta: previous.map(|p| current.total_payout - p.total_payout),
            prev_avg_payout: prev_avg,
            avg_payout_delta: prev_avg.map(|p| avg_payout - p),
        }
    }

    /// First observed year of its partition
    pub fn is_first(&self) -> bool {
        self.prev_year.is_none()
    }
}

/// Yearly totals and deltas per partition, ordered by partition then year.
///
/// Years with no claims are not synthesized: the delta of a year is taken
/// against the most recent earlier year that has claims.
pub fn yearly_delta(claims: &[ClassifiedClaim], grouping: TrendGrouping) -> Vec<YearRecord> {
    let mut totals: BTreeMap<(PartitionKey, i32), YearTotals> = BTreeMap::new();
    for claim in claims {
        let year = claim.year();
        let entry = totals
            .entry((grouping.partition_key(claim), year))
            .or_insert(YearTotals {
                year,
                claim_count: 0,
                total_payout: 0.0,
            });
        entry.claim_count += 1;
        entry.total_payout += claim.claim.final_payout;
    }

    let partitions = OrderedPartitions::build(
        totals.into_iter(),
        |((key, _), _)| key.clone(),
        |(_, totals)| totals.year,
    );
    debug!("Yearly trend over {} partitions ({:?})", partitions.len(), grouping);

    // Partitions are independent; flatten back in key order
    let walks: Vec<_> = partitions.iter().collect();
    walks
        .into_par_iter()
        .map(|(key, walk)| {
            walk.map(|(previous, (_, current))| {
                YearRecord::new(key, current, previous.map(|(_, p)| p))
            })
            .collect::<Vec<_>>()
        })
        .flatten()
        .collect()
}

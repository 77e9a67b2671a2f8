//! Reported-vs-verified loss discrepancy outliers per company
//!
//! Each company is scored by its mean `incurred - verified` loss. Companies
//! above the upper percentile of all company scores are flagged as
//! overstating, those below the lower percentile as understating. This is a
//! statistical deviation flag, not a fraud determination.

use crate::claim::ClassifiedClaim;
use crate::error::{AnalyticsError, Result};
use crate::stats::percentile::{percentile_sorted, sort_values};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_UPPER_PERCENTILE: f64 = 0.90;
pub const DEFAULT_LOWER_PERCENTILE: f64 = 0.10;
pub const DEFAULT_DETECTION_LIMIT: usize = 10;

/// Fewest distinct companies for which percentile thresholds mean anything
pub const MIN_COMPANIES: usize = 2;

/// Direction of the discrepancy to flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectMode {
    /// Reported loss well above verified loss
    Overstatement,
    /// Reported loss well below verified loss
    Understatement,
}

/// Mean discrepancy for one company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDiscrepancy {
    pub company_name: String,
    pub discrepancy_score: f64,
    pub claim_count: usize,
}

/// Percentile cut-offs over company scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub lower: f64,
    pub upper: f64,
    pub companies: usize,
}

/// Mean discrepancy per company, ordered by company name
pub fn company_discrepancies(claims: &[ClassifiedClaim]) -> Vec<CompanyDiscrepancy> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for claim in claims {
        let entry = sums.entry(claim.company()).or_insert((0.0, 0));
        entry.0 += claim.discrepancy();
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(company, (sum, count))| CompanyDiscrepancy {
            company_name: company.to_string(),
            discrepancy_score: sum / count as f64,
            claim_count: count,
        })
        .collect()
}

/// Compute lower/upper thresholds over company scores
pub fn discrepancy_thresholds(scores: &[f64], lower: f64, upper: f64) -> Result<Thresholds> {
    for p in [lower, upper] {
        if !(0.0..=1.0).contains(&p) {
            return Err(AnalyticsError::InvalidPercentile(p));
        }
    }
    if lower > upper {
        return Err(AnalyticsError::InvalidConfig(format!(
            "lower_percentile {lower} exceeds upper_percentile {upper}"
        )));
    }
    if scores.len() < MIN_COMPANIES {
        return Err(AnalyticsError::InsufficientGroups {
            found: scores.len(),
            required: MIN_COMPANIES,
        });
    }

    let mut sorted = scores.to_vec();
    sort_values(&mut sorted);
    Ok(Thresholds {
        lower: percentile_sorted(&sorted, lower)?,
        upper: percentile_sorted(&sorted, upper)?,
        companies: sorted.len(),
    })
}

/// Company scores with thresholds computed once up front
#[derive(Debug, Clone)]
pub struct DiscrepancyDetector {
    scores: Vec<CompanyDiscrepancy>,
    thresholds: Option<Thresholds>,
}

impl DiscrepancyDetector {
    /// Build with the default 10th/90th percentile thresholds
    pub fn new(claims: &[ClassifiedClaim]) -> Result<Self> {
        Self::with_percentiles(claims, DEFAULT_LOWER_PERCENTILE, DEFAULT_UPPER_PERCENTILE)
    }

    pub fn with_percentiles(claims: &[ClassifiedClaim], lower: f64, upper: f64) -> Result<Self> {
        let scores = company_discrepancies(claims);
        let values: Vec<f64> = scores.iter().map(|s| s.discrepancy_score).collect();

        let thresholds = match discrepancy_thresholds(&values, lower, upper) {
            Ok(thresholds) => Some(thresholds),
            Err(AnalyticsError::InsufficientGroups { found, .. }) => {
                debug!("Only {} companies; discrepancy thresholds are degenerate", found);
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(t) = &thresholds {
            debug!(
                "Discrepancy thresholds over {} companies: lower={:.2} upper={:.2}",
                t.companies, t.lower, t.upper
            );
        }

        Ok(Self { scores, thresholds })
    }

    pub fn scores(&self) -> &[CompanyDiscrepancy] {
        &self.scores
    }

    /// `None` when there are too few companies to rank
    pub fn thresholds(&self) -> Option<&Thresholds> {
        self.thresholds.as_ref()
    }

    /// Companies strictly beyond the threshold for `mode`, most extreme first
    pub fn flag(&self, mode: DetectMode, limit: usize) -> Vec<CompanyDiscrepancy> {
        let Some(thresholds) = self.thresholds else {
            return Vec::new();
        };

        let mut flagged: Vec<CompanyDiscrepancy> = self
            .scores
            .iter()
            .filter(|s| match mode {
                DetectMode::Overstatement => s.discrepancy_score > thresholds.upper,
                DetectMode::Understatement => s.discrepancy_score < thresholds.lower,
            })
            .cloned()
            .collect();

        flagged.sort_by(|a, b| {
            let by_score = match mode {
                DetectMode::Overstatement => b.discrepancy_score.total_cmp(&a.discrepancy_score),
                DetectMode::Understatement => a.discrepancy_score.total_cmp(&b.discrepancy_score),
            };
            by_score.then_with(|| a.company_name.cmp(&b.company_name))
        });
        flagged.truncate(limit);
        flagged
    }
}

/// One-shot detection with default thresholds
pub fn detect(
    claims: &[ClassifiedClaim],
    mode: DetectMode,
    limit: usize,
) -> Result<Vec<CompanyDiscrepancy>> {
    Ok(DiscrepancyDetector::new(claims)?.flag(mode, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn claim(id: usize, company: &str, incurred: f64, verified: f64) -> ClassifiedClaim {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        ClassifiedClaim::new(Claim::new(
            format!("P-{id}"),
            company,
            date,
            "phishing",
            incurred,
            verified,
            0.0,
        ))
    }

    /// Twenty companies with no discrepancy except `outlier`
    fn twenty_companies(outlier: (f64, f64)) -> Vec<ClassifiedClaim> {
        let mut claims: Vec<ClassifiedClaim> = (0..19)
            .map(|i| claim(i, &format!("company-{i:02}"), 10_000.0, 10_000.0))
            .collect();
        claims.push(claim(99, "outlier", outlier.0, outlier.1));
        claims
    }

    #[test]
    fn test_sole_overstating_company() {
        let claims = twenty_companies((100_000.0, 50_000.0));

        let over = detect(&claims, DetectMode::Overstatement, DEFAULT_DETECTION_LIMIT).unwrap();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].company_name, "outlier");
        assert_abs_diff_eq!(over[0].discrepancy_score, 50_000.0);

        let under = detect(&claims, DetectMode::Understatement, DEFAULT_DETECTION_LIMIT).unwrap();
        assert!(under.is_empty());
    }

    #[test]
    fn test_sole_understating_company() {
        let claims = twenty_companies((10_000.0, 40_000.0));
        let under = detect(&claims, DetectMode::Understatement, 10).unwrap();
        assert_eq!(under.len(), 1);
        assert_abs_diff_eq!(under[0].discrepancy_score, -30_000.0);
    }

    #[test]
    fn test_single_company_returns_empty() {
        let claims = vec![
            claim(1, "acme", 100_000.0, 10.0),
            claim(2, "acme", 5.0, 90_000.0),
        ];
        let detector = DiscrepancyDetector::new(&claims).unwrap();
        assert!(detector.thresholds().is_none());
        assert!(detector.flag(DetectMode::Overstatement, 10).is_empty());
        assert!(detector.flag(DetectMode::Understatement, 10).is_empty());
    }

    #[test]
    fn test_no_claims_returns_empty() {
        assert!(detect(&[], DetectMode::Overstatement, 10).unwrap().is_empty());
    }

    #[test]
    fn test_thresholds_need_two_companies() {
        let err = discrepancy_thresholds(&[1.0], 0.1, 0.9).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientGroups { found: 1, required: 2 }));
    }

    #[test]
    fn test_percentiles_validated_before_group_count() {
        let one_company = vec![claim(1, "acme", 100.0, 50.0)];
        let many: Vec<ClassifiedClaim> = (0..5)
            .map(|i| claim(i, &format!("c{i}"), 100.0 * i as f64, 50.0))
            .collect();

        for claims in [&one_company, &many] {
            let err = DiscrepancyDetector::with_percentiles(claims, 5.0, 7.0).unwrap_err();
            assert!(matches!(err, AnalyticsError::InvalidPercentile(p) if p == 5.0));
        }
        assert!(matches!(
            discrepancy_thresholds(&[], 0.1, 1.5),
            Err(AnalyticsError::InvalidPercentile(_))
        ));
    }

    #[test]
    fn test_inverted_percentiles_are_config_error() {
        let claims: Vec<ClassifiedClaim> = (0..5)
            .map(|i| claim(i, &format!("c{i}"), 100.0 * i as f64, 50.0))
            .collect();
        let err = DiscrepancyDetector::with_percentiles(&claims, 0.9, 0.1).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfig(_)));
        let err = DiscrepancyDetector::with_percentiles(&claims[..1], 0.9, 0.1).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfig(_)));
    }

    #[test]
    fn test_company_score_is_mean() {
        let claims = vec![
            claim(1, "acme", 300.0, 100.0),
            claim(2, "acme", 100.0, 100.0),
            claim(3, "beta", 50.0, 100.0),
        ];
        let scores = company_discrepancies(&claims);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].company_name, "acme");
        assert_abs_diff_eq!(scores[0].discrepancy_score, 100.0);
        assert_eq!(scores[0].claim_count, 2);
        assert_abs_diff_eq!(scores[1].discrepancy_score, -50.0);
    }

    #[test]
    fn test_ordering_and_limit() {
        // 100 companies with scores 0..99; upper threshold = 89.1, lower = 9.9
        let claims: Vec<ClassifiedClaim> = (0..100)
            .map(|i| claim(i, &format!("c{i:03}"), i as f64, 0.0))
            .collect();
        let detector = DiscrepancyDetector::new(&claims).unwrap();

        let over = detector.flag(DetectMode::Overstatement, 3);
        let scores: Vec<f64> = over.iter().map(|c| c.discrepancy_score).collect();
        assert_eq!(scores, vec![99.0, 98.0, 97.0]);
        assert_eq!(detector.flag(DetectMode::Overstatement, 100).len(), 10);

        let under = detector.flag(DetectMode::Understatement, 100);
        let scores: Vec<f64> = under.iter().map(|c| c.discrepancy_score).collect();
        assert_eq!(scores, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_uniform_scores_flag_nothing() {
        let claims: Vec<ClassifiedClaim> = (0..5)
            .map(|i| claim(i, &format!("c{i}"), 100.0, 50.0))
            .collect();
        let detector = DiscrepancyDetector::new(&claims).unwrap();
        assert!(detector.flag(DetectMode::Overstatement, 10).is_empty());
        assert!(detector.flag(DetectMode::Understatement, 10).is_empty());
    }
}

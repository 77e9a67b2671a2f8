use chrono::NaiveDate;
use claims_analytics::discrepancy::DiscrepancyDetector;
use claims_analytics::stats::percentile;
use claims_analytics::{
    aggregate, classify, yearly_delta, Claim, ClassifiedClaim, DetectMode, Field, GroupBy,
    TrendGrouping,
};
use proptest::prelude::*;
use std::collections::HashSet;

const DESCRIPTIONS: [&str; 6] = [
    "ransomware outbreak",
    "phishing kit",
    "data breach of crm",
    "ransomware and phishing combined",
    "ddos",
    "",
];

fn arb_claims() -> impl Strategy<Value = Vec<ClassifiedClaim>> {
    prop::collection::vec(
        (0usize..6, 2018i32..2024, 0usize..6, 0.0f64..1e6, 0.0f64..1e6, 0.0f64..1e5),
        1..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (company, year, desc, incurred, verified, payout))| {
                let date = NaiveDate::from_ymd_opt(year, 1 + (i % 12) as u32, 1).unwrap();
                ClassifiedClaim::new(Claim::new(
                    format!("P-{i}"),
                    format!("company-{company}"),
                    date,
                    DESCRIPTIONS[desc],
                    incurred,
                    verified,
                    payout,
                ))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn classify_is_deterministic(text in ".{0,80}") {
        prop_assert_eq!(classify(&text), classify(&text));
    }

    #[test]
    fn ransomware_wins_over_phishing(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
        let text = format!("{prefix}PHISHING then Ransomware{suffix}");
        prop_assert_eq!(classify(&text), claims_analytics::ThreatType::Ransomware);
    }

    #[test]
    fn group_counts_sum_to_input(claims in arb_claims()) {
        for group_by in [GroupBy::Company, GroupBy::ThreatType, GroupBy::Year, GroupBy::CompanyThreatYear] {
            let result = aggregate(&claims, group_by, Field::FinalPayout).unwrap();
            let total: usize = result.values().map(|s| s.count).sum();
            prop_assert_eq!(total, claims.len());
        }
    }

    #[test]
    fn percentiles_are_monotone(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
        let p10 = percentile(&values, 0.10).unwrap();
        let median = percentile(&values, 0.50).unwrap();
        let p90 = percentile(&values, 0.90).unwrap();
        let p95 = percentile(&values, 0.95).unwrap();
        prop_assert!(p10 <= median && median <= p90 && p90 <= p95);
    }

    #[test]
    fn group_stats_are_monotone(claims in arb_claims()) {
        let result = aggregate(&claims, GroupBy::Company, Field::Discrepancy).unwrap();
        for stats in result.values() {
            prop_assert!(stats.min <= stats.p10);
            prop_assert!(stats.p10 <= stats.median);
            prop_assert!(stats.median <= stats.p90);
            prop_assert!(stats.p90 <= stats.p95);
            prop_assert!(stats.p95 <= stats.max);
        }
    }

    #[test]
    fn detector_directions_are_disjoint(claims in arb_claims()) {
        let detector = DiscrepancyDetector::new(&claims).unwrap();
        let over: HashSet<String> = detector
            .flag(DetectMode::Overstatement, usize::MAX)
            .into_iter()
            .map(|c| c.company_name)
            .collect();
        let under: HashSet<String> = detector
            .flag(DetectMode::Understatement, usize::MAX)
            .into_iter()
            .map(|c| c.company_name)
            .collect();
        prop_assert!(over.is_disjoint(&under));
    }

    #[test]
    fn first_year_has_no_previous(claims in arb_claims()) {
        for grouping in [TrendGrouping::Global, TrendGrouping::Company, TrendGrouping::CompanyThreat] {
            let records = yearly_delta(&claims, grouping);
            let mut seen = HashSet::new();
            for record in &records {
                let key = (record.company.clone(), record.threat_type);
                if seen.insert(key) {
                    prop_assert!(record.is_first());
                    prop_assert!(record.claim_count_delta.is_none());
                    prop_assert!(record.total_payout_delta.is_none());
                    prop_assert!(record.avg_payout_delta.is_none());
                } else {
                    prop_assert!(record.prev_year.unwrap() < record.year);
                    prop_assert!(record.claim_count_delta.is_some());
                }
            }
            let total: usize = records.iter().map(|r| r.claim_count).sum();
            prop_assert_eq!(total, claims.len());
        }
    }
}

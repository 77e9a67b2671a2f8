//! Claim records as handed to the analytics engine

use crate::threat::{classify, ThreatType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single cleaned cyber-insurance claim (one per policy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique policy identifier
    pub policy_number: String,

    /// Normalized company name (trimmed, lower-cased)
    pub company_name: String,

    pub date_of_incident: NaiveDate,

    /// Free-text description, source of the threat type
    pub description_of_incident: String,

    /// Loss as reported by the insured
    pub incurred_loss_amount: f64,

    /// Loss after independent verification
    pub verified_incurred_loss_amount: f64,

    pub deductible: f64,

    pub coverage_limit: f64,

    pub coverage_percentage: f64,

    /// Amount paid (0 when the source had no payout)
    pub final_payout: f64,
}

impl Claim {
    /// Create a claim with the fields the analytics depend on; policy terms
    /// default to an uncapped coverage with zero deductible
    pub fn new(
        policy_number: impl Into<String>,
        company_name: impl Into<String>,
        date_of_incident: NaiveDate,
        description_of_incident: impl Into<String>,
        incurred_loss_amount: f64,
        verified_incurred_loss_amount: f64,
        final_payout: f64,
    ) -> Self {
        Self {
            policy_number: policy_number.into(),
            company_name: company_name.into(),
            date_of_incident,
            description_of_incident: description_of_incident.into(),
            incurred_loss_amount,
            verified_incurred_loss_amount,
            deductible: 0.0,
            coverage_limit: f64::MAX,
            coverage_percentage: 1.0,
            final_payout,
        }
    }

    /// Calendar year of the incident
    pub fn year(&self) -> i32 {
        self.date_of_incident.year()
    }

    /// Reported minus verified loss; positive means overstatement
    pub fn discrepancy(&self) -> f64 {
        self.incurred_loss_amount - self.verified_incurred_loss_amount
    }
}

/// A claim paired with its derived threat type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedClaim {
    pub claim: Claim,
    pub threat_type: ThreatType,
}

impl ClassifiedClaim {
    pub fn new(claim: Claim) -> Self {
        let threat_type = classify(&claim.description_of_incident);
        Self { claim, threat_type }
    }

    pub fn company(&self) -> &str {
        &self.claim.company_name
    }

    pub fn year(&self) -> i32 {
        self.claim.year()
    }

    pub fn discrepancy(&self) -> f64 {
        self.claim.discrepancy()
    }
}

/// Run the classifier stage over a loaded dataset
pub fn classify_claims(claims: Vec<Claim>) -> Vec<ClassifiedClaim> {
    claims.into_iter().map(ClassifiedClaim::new).collect()
}

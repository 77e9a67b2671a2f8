//! Load and clean claims from a CSV extract

use super::Claim;
use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, Trim};
use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw CSV row matching the claims table columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    policy_number: String,
    company_name: String,
    date_of_incident: String,
    #[serde(default)]
    description_of_incident: Option<String>,
    incurred_loss_amount: f64,
    verified_incurred_loss_amount: f64,
    deductible: f64,
    coverage_limit: f64,
    coverage_percentage: f64,
    #[serde(default)]
    final_payout: Option<f64>,
}

impl CsvRow {
    fn to_claim(self) -> Result<Claim> {
        let invalid = |reason: &str| AnalyticsError::InvalidRecord {
            policy_number: self.policy_number.clone(),
            reason: reason.to_string(),
        };

        if self.policy_number.trim().is_empty() {
            return Err(invalid("empty policy number"));
        }

        let final_payout = self.final_payout.unwrap_or(0.0);
        let amounts = [
            ("incurred_loss_amount", self.incurred_loss_amount),
            ("verified_incurred_loss_amount", self.verified_incurred_loss_amount),
            ("deductible", self.deductible),
            ("coverage_limit", self.coverage_limit),
            ("coverage_percentage", self.coverage_percentage),
            ("final_payout", final_payout),
        ];
        if let Some((column, _)) = amounts.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(&format!("{column} is not a finite number")));
        }

        if self.incurred_loss_amount < 0.0 {
            return Err(invalid("negative incurred loss"));
        }
        if self.verified_incurred_loss_amount < 0.0 {
            return Err(invalid("negative verified loss"));
        }
        if !(final_payout <= self.coverage_limit) {
            return Err(invalid("final payout exceeds coverage limit"));
        }

        let company_name = normalize_company_name(&self.company_name);
        if company_name.is_empty() {
            return Err(invalid("empty company name"));
        }

        let date_of_incident = NaiveDate::parse_from_str(self.date_of_incident.trim(), DATE_FORMAT)
            .map_err(|e| invalid(&format!("bad date_of_incident '{}': {e}", self.date_of_incident)))?;

        Ok(Claim {
            policy_number: self.policy_number.trim().to_string(),
            company_name,
            date_of_incident,
            description_of_incident: self.description_of_incident.unwrap_or_default(),
            incurred_loss_amount: self.incurred_loss_amount,
            verified_incurred_loss_amount: self.verified_incurred_loss_amount,
            deductible: self.deductible,
            coverage_limit: self.coverage_limit,
            coverage_percentage: self.coverage_percentage,
            final_payout,
        })
    }
}

/// Trim, collapse inner whitespace and case-fold a company name
pub fn normalize_company_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.trim(Trim::All);
    builder
}

/// Load all claims from a CSV file
pub fn load_claims<P: AsRef<Path>>(path: P) -> Result<Vec<Claim>> {
    let path = path.as_ref();
    let reader = reader_builder().from_path(path)?;
    let claims = read_claims(reader)?;
    info!("Loaded {} claims from {}", claims.len(), path.display());
    Ok(claims)
}

/// Load claims from any reader (e.g., string buffer, network stream)
pub fn load_claims_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Claim>> {
    read_claims(reader_builder().from_reader(reader))
}

fn read_claims<R: std::io::Read>(mut csv_reader: Reader<R>) -> Result<Vec<Claim>> {
    let mut seen = HashSet::new();
    let mut claims = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let claim = row.to_claim()?;
        if !seen.insert(claim.policy_number.clone()) {
            return Err(AnalyticsError::DuplicatePolicy(claim.policy_number));
        }
        if claim.verified_incurred_loss_amount == 0.0 && claim.incurred_loss_amount > 0.0 {
            warn!(
                "Claim {} has a reported loss but no verified loss",
                claim.policy_number
            );
        }
        claims.push(claim);
    }

    Ok(claims)
}

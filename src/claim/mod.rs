//! Claim records, classification stage and CSV loading

mod data;
pub mod loader;

pub use data::{classify_claims, Claim, ClassifiedClaim};
pub use loader::{load_claims, load_claims_from_reader, normalize_company_name};

//! Threat classification from free-text incident descriptions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of cyberattack derived from an incident description
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThreatType {
    Ransomware,
    Phishing,
    #[serde(rename = "Data Breach")]
    DataBreach,
    Other,
}

impl ThreatType {
    /// All categories in classification priority order
    pub const ALL: [ThreatType; 4] = [
        ThreatType::Ransomware,
        ThreatType::Phishing,
        ThreatType::DataBreach,
        ThreatType::Other,
    ];

    /// Lower-case keyword that selects this category, `None` for the fallback
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            ThreatType::Ransomware => Some("ransomware"),
            ThreatType::Phishing => Some("phishing"),
            ThreatType::DataBreach => Some("data breach"),
            ThreatType::Other => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatType::Ransomware => "Ransomware",
            ThreatType::Phishing => "Phishing",
            ThreatType::DataBreach => "Data Breach",
            ThreatType::Other => "Other",
        }
    }
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a description; first keyword hit in priority order wins
pub fn classify(description: &str) -> ThreatType {
    let text = description.to_lowercase();
    ThreatType::ALL
        .iter()
        .copied()
        .find(|threat| threat.keyword().is_some_and(|kw| text.contains(kw)))
        .unwrap_or(ThreatType::Other)
}

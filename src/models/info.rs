//! Informational lookup topics

use std::fmt;
use std::str::FromStr;

/// Destination information the backend can look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoTopic {
    Visa,
    Culture,
    Currency,
    Health,
    Transportation,
    Language,
}

impl InfoTopic {
    pub const ALL: [InfoTopic; 6] = [
        InfoTopic::Visa,
        InfoTopic::Culture,
        InfoTopic::Currency,
        InfoTopic::Health,
        InfoTopic::Transportation,
        InfoTopic::Language,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfoTopic::Visa => "visa",
            InfoTopic::Culture => "culture",
            InfoTopic::Currency => "currency",
            InfoTopic::Health => "health",
            InfoTopic::Transportation => "transportation",
            InfoTopic::Language => "language",
        }
    }

    pub fn path(&self) -> String {
        format!("/info/{}", self.as_str())
    }

    /// Visa requirements depend on the traveler's nationality
    pub fn requires_nationality(&self) -> bool {
        matches!(self, InfoTopic::Visa)
    }
}

impl fmt::Display for InfoTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfoTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        InfoTopic::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("Unknown info topic: {}", s))
    }
}

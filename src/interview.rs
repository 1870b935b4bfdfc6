use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which interview track the candidate is rehearsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    /// Corporate finance (valuation, M&A, accounting)
    Corporate,
    /// Sales & trading (markets, strategies, hedging)
    Market,
}

impl InterviewType {
    /// Wire value used by the credential endpoint and question bank
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Corporate => "corporate",
            InterviewType::Market => "market",
        }
    }

    /// Header text shown above the session
    pub fn label(&self) -> &'static str {
        match self {
            InterviewType::Corporate => "Entretien Finance d'Entreprise",
            InterviewType::Market => "Entretien Sales & Trading",
        }
    }

    /// Value of the `interview_type` dynamic variable sent to the agent
    pub fn agent_label(&self) -> &'static str {
        match self {
            InterviewType::Corporate => "Finance d'Entreprise",
            InterviewType::Market => "Sales & Trading",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "corporate" => Ok(InterviewType::Corporate),
            "market" => Ok(InterviewType::Market),
            other => anyhow::bail!("unknown interview type: {}", other),
        }
    }
}

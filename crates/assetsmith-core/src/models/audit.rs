use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Status recorded for one processing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Fail,
}

impl Display for AuditStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuditStatus::Success => write!(f, "success"),
            AuditStatus::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for AuditStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AuditStatus::Success),
            "fail" => Ok(AuditStatus::Fail),
            _ => Err(anyhow::anyhow!("Invalid audit status: {}", s)),
        }
    }
}

/// One append-only audit log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub ts: DateTime<Utc>,
    pub row_id: String,
    pub description: String,
    pub example_url: String,
    pub output_format: String,
    pub model: String,
    /// Empty on failure
    pub output_url: String,
    pub status: AuditStatus,
    /// Truncated error text, empty on success
    pub error: String,
}

/// Aggregate of audit entries by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub success: i64,
    pub fail: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.success + self.fail
    }
}

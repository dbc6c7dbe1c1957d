use serde::{Deserialize, Serialize};

use crate::models::RowStatus;

/// Terminal result of processing one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RowOutcome {
    Success { output_url: String },
    Failed { error: String },
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success { .. })
    }

    /// Values for the three outcome columns, in (status, output_url, error) order
    pub fn cells(&self) -> OutcomeCells<'_> {
        match self {
            RowOutcome::Success { output_url } => OutcomeCells {
                status: RowStatus::Done.as_cell(),
                output_url,
                error: "",
            },
            RowOutcome::Failed { error } => OutcomeCells {
                status: RowStatus::Failed.as_cell(),
                output_url: "",
                error,
            },
        }
    }
}

/// Cell values written back to the sheet for one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeCells<'a> {
    pub status: &'a str,
    pub output_url: &'a str,
    pub error: &'a str,
}

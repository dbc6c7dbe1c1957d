use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::{DEFAULT_MODEL_TAG, SHEET_HEADER_ROWS};
use crate::error::AppError;
use crate::models::OutputFormat;

/// Status column of a task row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Empty cell or any value other than `done` / `failed`
    Pending,
    Done,
    Failed,
}

impl RowStatus {
    /// Classify a raw status cell (trimmed, case-insensitive)
    pub fn parse(cell: &str) -> Self {
        match cell.trim().to_lowercase().as_str() {
            "done" => RowStatus::Done,
            "failed" => RowStatus::Failed,
            _ => RowStatus::Pending,
        }
    }

    /// Value written back to the status column
    pub fn as_cell(self) -> &'static str {
        match self {
            RowStatus::Pending => "",
            RowStatus::Done => "done",
            RowStatus::Failed => "failed",
        }
    }
}

impl Display for RowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RowStatus::Pending => write!(f, "pending"),
            RowStatus::Done => write!(f, "done"),
            RowStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One row of the source spreadsheet, keyed by header name.
///
/// Cells are kept as the operator typed them; the accessors apply the minimal
/// coercion the pipeline needs (trimming, defaults, upper-casing the format).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "cell_string")]
    pub id: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub description: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub example_asset_url: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub output_format: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub model: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub status: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub output_url: String,
    #[serde(default, deserialize_with = "cell_string")]
    pub error: String,
}

impl TaskRecord {
    /// Identifier used for logging and artifact naming.
    ///
    /// Falls back to the sheet line number when the `id` cell is empty; the
    /// fallback never affects which line outcomes are written to.
    pub fn identifier(&self, row_number: usize) -> String {
        let id = self.id.trim();
        if id.is_empty() {
            row_number.to_string()
        } else {
            id.to_string()
        }
    }

    pub fn description(&self) -> &str {
        self.description.trim()
    }

    pub fn example_url(&self) -> &str {
        self.example_asset_url.trim()
    }

    /// Upper-cased format label, `PNG` when the cell is empty
    pub fn format_label(&self) -> String {
        let fmt = self.output_format.trim();
        if fmt.is_empty() {
            OutputFormat::Png.to_string()
        } else {
            fmt.to_uppercase()
        }
    }

    pub fn output_format(&self) -> Result<OutputFormat, AppError> {
        self.format_label().parse()
    }

    /// Model tag, `OpenAI` when the cell is empty
    pub fn model_tag(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            DEFAULT_MODEL_TAG
        } else {
            model
        }
    }

    pub fn uses_claude_prompt(&self) -> bool {
        self.model_tag().eq_ignore_ascii_case("claude")
    }

    pub fn status(&self) -> RowStatus {
        RowStatus::parse(&self.status)
    }
}

/// A task record together with its position in the sheet.
///
/// Addressing convention: the record at zero-based position `index` of the data
/// rows lives on 1-based sheet line `index + SHEET_HEADER_ROWS + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub index: usize,
    pub record: TaskRecord,
}

impl SheetRow {
    pub fn new(index: usize, record: TaskRecord) -> Self {
        Self { index, record }
    }

    /// 1-based sheet line holding the data row at `index`
    pub fn line_number(index: usize) -> usize {
        index + SHEET_HEADER_ROWS + 1
    }

    /// 1-based line number of this row in the backing sheet
    pub fn row_number(&self) -> usize {
        Self::line_number(self.index)
    }

    pub fn identifier(&self) -> String {
        self.record.identifier(self.row_number())
    }
}

/// Accept strings, numbers, booleans and nulls for any cell.
fn cell_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parsing_treats_unknown_values_as_pending() {
        assert_eq!(RowStatus::parse(""), RowStatus::Pending);
        assert_eq!(RowStatus::parse(" Done "), RowStatus::Done);
        assert_eq!(RowStatus::parse("FAILED"), RowStatus::Failed);
        assert_eq!(RowStatus::parse("in progress"), RowStatus::Pending);
    }

    #[test]
    fn record_coerces_numeric_cells() {
        let record: TaskRecord = serde_json::from_value(json!({
            "id": 7,
            "description": "a red sword icon",
            "output_format": "png",
            "model": "OpenAI",
            "status": ""
        }))
        .unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.format_label(), "PNG");
        assert_eq!(record.output_format().unwrap(), OutputFormat::Png);
        assert!(record.example_asset_url.is_empty());
    }

    #[test]
    fn defaults_for_empty_cells() {
        let record = TaskRecord::default();
        assert_eq!(record.format_label(), "PNG");
        assert_eq!(record.model_tag(), "OpenAI");
        assert_eq!(record.status(), RowStatus::Pending);
        assert!(!record.uses_claude_prompt());
    }

    #[test]
    fn claude_tag_is_case_insensitive() {
        let record = TaskRecord {
            model: " Claude ".to_string(),
            ..Default::default()
        };
        assert!(record.uses_claude_prompt());
    }

    #[test]
    fn identifier_falls_back_to_sheet_line() {
        let row = SheetRow::new(3, TaskRecord::default());
        assert_eq!(row.row_number(), 5);
        assert_eq!(row.identifier(), "5");

        let row = SheetRow::new(
            0,
            TaskRecord {
                id: "hero-01".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(row.row_number(), 2);
        assert_eq!(row.identifier(), "hero-01");
    }

    #[test]
    fn line_numbers_skip_the_header() {
        assert_eq!(SheetRow::line_number(0), 2);
        assert_eq!(SheetRow::line_number(3), 5);
        assert_eq!(
            SheetRow::new(7, TaskRecord::default()).row_number(),
            SheetRow::line_number(7)
        );
    }
}

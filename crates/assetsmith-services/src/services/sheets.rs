//! Spreadsheet task store
//!
//! The first worksheet holds one header line followed by task rows. Columns are
//! looked up by header name when reading; outcomes are written to the fixed
//! status / output_url / error columns.

use assetsmith_core::constants::{ERROR_COLUMN, OUTPUT_URL_COLUMN, STATUS_COLUMN};
use assetsmith_core::models::{RowOutcome, SheetRow, TaskRecord};
use assetsmith_core::AppError;
use assetsmith_infra::{google_api_error, AccessTokenProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Header names expected at the outcome column positions
const OUTCOME_HEADERS: [(usize, &str); 3] = [
    (STATUS_COLUMN, "status"),
    (OUTPUT_URL_COLUMN, "output_url"),
    (ERROR_COLUMN, "error"),
];

/// Port to the task spreadsheet
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Snapshot of every task row, in sheet order
    async fn read_all_rows(&self) -> Result<Vec<SheetRow>, AppError>;

    /// Overwrite one cell (1-based line and column)
    async fn write_cell(&self, row_number: usize, column: usize, value: &str)
        -> Result<(), AppError>;

    /// Write the three outcome columns, status last
    async fn write_outcome(&self, row_number: usize, outcome: &RowOutcome) -> Result<(), AppError> {
        let cells = outcome.cells();
        self.write_cell(row_number, OUTPUT_URL_COLUMN, cells.output_url)
            .await?;
        self.write_cell(row_number, ERROR_COLUMN, cells.error).await?;
        self.write_cell(row_number, STATUS_COLUMN, cells.status).await
    }
}

/// A1 column letters for a 1-based column index
pub fn column_letter(column: usize) -> String {
    let mut n = column.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quote a worksheet title for use in an A1 range
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Build task rows from a values grid whose first line is the header.
///
/// Header names are trimmed and lower-cased; missing trailing cells read as empty.
pub fn rows_from_values(values: Vec<Vec<Value>>) -> Result<Vec<SheetRow>, AppError> {
    let mut lines = values.into_iter();
    let Some(header_line) = lines.next() else {
        return Ok(Vec::new());
    };

    let header: Vec<String> = header_line
        .iter()
        .map(|cell| match cell {
            Value::String(s) => s.trim().to_lowercase(),
            other => other.to_string().trim().to_lowercase(),
        })
        .collect();
    validate_header(&header)?;

    lines
        .enumerate()
        .map(|(index, cells)| {
            let mut object = Map::new();
            for (i, name) in header.iter().enumerate() {
                if name.is_empty() {
                    continue;
                }
                let value = cells.get(i).cloned().unwrap_or(Value::Null);
                object.insert(name.clone(), value);
            }
            let record: TaskRecord = serde_json::from_value(Value::Object(object))
                .map_err(|e| {
                    AppError::Sheet(format!("Row {}: {}", SheetRow::line_number(index), e))
                })?;
            Ok(SheetRow::new(index, record))
        })
        .collect()
}

fn validate_header(header: &[String]) -> Result<(), AppError> {
    for (column, expected) in OUTCOME_HEADERS {
        let found = header.get(column - 1).map(String::as_str).unwrap_or("");
        if found != expected {
            return Err(AppError::Sheet(format!(
                "Header column {} must be '{}', found '{}'",
                column_letter(column),
                expected,
                found
            )));
        }
    }
    if !header.iter().any(|h| h == "description") {
        return Err(AppError::Sheet(
            "Header is missing the 'description' column".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets API client for one spreadsheet
pub struct GoogleSheetsStore {
    http_client: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    spreadsheet_id: String,
    api_base: String,
    sheet_title: OnceCell<String>,
}

impl GoogleSheetsStore {
    pub fn new(
        http_client: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
        spreadsheet_id: String,
    ) -> Self {
        Self {
            http_client,
            tokens,
            spreadsheet_id,
            api_base: SHEETS_API_BASE.to_string(),
            sheet_title: OnceCell::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn token(&self) -> Result<String, AppError> {
        self.tokens
            .access_token()
            .await
            .map_err(|e| {
                AppError::Configuration(format!("Google authorization failed: {:#}", e))
            })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    /// Title of the first worksheet, resolved once
    async fn sheet_title(&self) -> Result<&str, AppError> {
        let title = self
            .sheet_title
            .get_or_try_init(|| async {
                let token = self.token().await?;
                let response = self
                    .http_client
                    .get(self.spreadsheet_url())
                    .query(&[("fields", "sheets.properties.title")])
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(|e| AppError::Sheet(format!("Failed to open spreadsheet: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::Sheet(google_api_error(status, &body)));
                }

                let meta: SpreadsheetMeta = response.json().await.map_err(|e| {
                    AppError::Sheet(format!("Unexpected spreadsheet metadata: {}", e))
                })?;
                meta.sheets
                    .into_iter()
                    .next()
                    .map(|sheet| sheet.properties.title)
                    .ok_or_else(|| AppError::Sheet("Spreadsheet has no worksheets".to_string()))
            })
            .await?;
        Ok(title.as_str())
    }

    async fn put_values(&self, range: &str, values: Value) -> Result<(), AppError> {
        let token = self.token().await?;
        let response = self
            .http_client
            .put(self.values_url(range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(|e| AppError::Sheet(format!("Failed to update {}: {}", range, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheet(google_api_error(status, &body)));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    #[tracing::instrument(skip(self), fields(spreadsheet_id = %self.spreadsheet_id))]
    async fn read_all_rows(&self) -> Result<Vec<SheetRow>, AppError> {
        let title = self.sheet_title().await?;
        let token = self.token().await?;

        let response = self
            .http_client
            .get(self.values_url(&quote_title(title)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Sheet(format!("Failed to read rows: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheet(google_api_error(status, &body)));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| AppError::Sheet(format!("Unexpected values response: {}", e)))?;

        let rows = rows_from_values(range.values)?;
        tracing::debug!(rows = rows.len(), "Read task rows");
        Ok(rows)
    }

    async fn write_cell(
        &self,
        row_number: usize,
        column: usize,
        value: &str,
    ) -> Result<(), AppError> {
        let title = self.sheet_title().await?;
        let range = format!(
            "{}!{}{}",
            quote_title(title),
            column_letter(column),
            row_number
        );
        self.put_values(&range, json!([[value]])).await
    }

    /// The outcome columns are adjacent, so all three go in one update
    async fn write_outcome(&self, row_number: usize, outcome: &RowOutcome) -> Result<(), AppError> {
        let title = self.sheet_title().await?;
        let cells = outcome.cells();
        let range = format!(
            "{}!{}{}:{}{}",
            quote_title(title),
            column_letter(STATUS_COLUMN),
            row_number,
            column_letter(ERROR_COLUMN),
            row_number
        );
        self.put_values(
            &range,
            json!([[cells.status, cells.output_url, cells.error]]),
        )
        .await
    }
}

use assetsmith_core::models::{AuditEntry, AuditStatus, StatusCounts};
use assetsmith_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// Append-only store of processing attempts
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Record one attempt. Entries are never updated or deleted.
    async fn append(&self, entry: &AuditEntry) -> Result<(), AppError>;

    /// Number of entries per status over the whole history
    async fn status_counts(&self) -> Result<StatusCounts, AppError>;

    /// Most recent entries first
    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError>;
}

/// Open (creating if needed) the SQLite audit database and apply migrations
pub async fn connect_audit_store(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::debug!(database_url = %database_url, "Audit store ready");
    Ok(pool)
}

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditStore for AuditLogRepository {
    #[tracing::instrument(skip(self, entry), fields(
        db.system = "sqlite",
        db.table = "logs",
        db.operation = "insert",
        row_id = %entry.row_id
    ))]
    async fn append(&self, entry: &AuditEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO logs (
                ts, row_id, description, example_url, output_format,
                model, output_url, status, error
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.ts.to_rfc3339())
        .bind(&entry.row_id)
        .bind(&entry.description)
        .bind(&entry.example_url)
        .bind(&entry.output_format)
        .bind(&entry.model)
        .bind(&entry.output_url)
        .bind(entry.status.to_string())
        .bind(&entry.error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, row_id = %entry.row_id, "Failed to append audit entry");
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn status_counts(&self) -> Result<StatusCounts, AppError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM logs GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let total: i64 = row.try_get("total")?;
            match status.parse::<AuditStatus>() {
                Ok(AuditStatus::Success) => counts.success += total,
                Ok(AuditStatus::Fail) => counts.fail += total,
                Err(_) => {
                    tracing::warn!(status = %status, total, "Ignoring unknown audit status");
                }
            }
        }

        Ok(counts)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT ts, row_id, description, example_url, output_format,
                   model, output_url, status, error
            FROM logs
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let ts: String = row.try_get("ts")?;
                let status: String = row.try_get("status")?;
                Ok(AuditEntry {
                    ts: parse_timestamp(&ts)?,
                    row_id: row.try_get("row_id")?,
                    description: row.try_get("description")?,
                    example_url: row.try_get("example_url")?,
                    output_format: row.try_get("output_format")?,
                    model: row.try_get("model")?,
                    output_url: row.try_get("output_url")?,
                    status: status
                        .parse()
                        .map_err(|e: anyhow::Error| AppError::Internal(e.to_string()))?,
                    error: row.try_get("error")?,
                })
            })
            .collect()
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid audit timestamp {}: {}", value, e)))
}

//! Assetsmith CLI: batch generation of game assets from a task spreadsheet.
//!
//! Configuration comes from the environment (and `.env`); see `Config::from_env`.

use anyhow::Context;
use assetsmith_cli::{
    audit_store, build_controller, build_report_service, format_history_table,
    format_rows_table, http_client, sheet_store,
};
use assetsmith_core::{AppError, Config, ErrorMetadata};
use assetsmith_db::AuditStore;
use assetsmith_infra::{init_telemetry, LogFormat};
use assetsmith_services::SheetStore;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "assetsmith", about = "Generate, upload and report game assets from a sheet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every eligible row once (default)
    Run {
        /// Reprocess rows whose status is `failed`
        #[arg(long)]
        retry_failed: bool,
        /// Skip the generative backend and use placeholder assets
        #[arg(long)]
        demo: bool,
    },
    /// Chart the audit log, upload it and notify
    Report,
    /// Print every sheet row with its status
    Rows,
    /// List the most recent audit entries
    History {
        /// Maximum number of entries
        #[arg(long, default_value = "20")]
        limit: i64,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputStyle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputStyle {
    Json,
    Table,
}

fn load_config(validate: bool) -> anyhow::Result<Config> {
    let config = Config::from_env()?;
    if validate {
        config.validate().inspect_err(|e| {
            tracing::error!(error_code = e.error_code(), error = %e, "Invalid configuration")
        })?;
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        retry_failed: false,
        demo: false,
    });

    match command {
        Commands::Run { retry_failed, demo } => {
            let mut config = load_config(true)?;
            config.flags.retry_failed |= retry_failed;
            config.flags.demo_mode |= demo;

            let controller = build_controller(&config, http_client(&config)?).await?;
            let summary = controller.run_once().await?;
            println!(
                "Run {}: {} rows, {} succeeded, {} failed, {} skipped",
                summary.run_id,
                summary.total_rows,
                summary.succeeded,
                summary.failed,
                summary.skipped
            );
            if summary.persistence_errors > 0 {
                return Err(AppError::Sheet(format!(
                    "{} row outcome(s) could not be recorded",
                    summary.persistence_errors
                ))
                .into());
            }
        }
        Commands::Report => {
            let config = load_config(true)?;
            let service = build_report_service(&config, http_client(&config)?).await?;
            let report = service.send_report().await?;
            println!(
                "Success={}, Fail={}\n{}",
                report.counts.success, report.counts.fail, report.url
            );
        }
        Commands::Rows => {
            let config = load_config(true)?;
            let sheets = sheet_store(&config, http_client(&config)?)?;
            let rows = sheets.read_all_rows().await?;
            print!("{}", format_rows_table(&rows));
        }
        Commands::History { limit, format } => {
            let config = load_config(false)?;
            let entries = audit_store(&config).await?.list_recent(limit).await?;
            match format {
                OutputStyle::Json => {
                    let out =
                        serde_json::to_string_pretty(&entries).context("Serialize entries")?;
                    println!("{}", out);
                }
                OutputStyle::Table => print!("{}", format_history_table(&entries)),
            }
        }
    }

    Ok(())
}

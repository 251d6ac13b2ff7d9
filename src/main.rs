use std::sync::Arc;

use chrono::Local;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use laporin::config::Config;
use laporin::core::Result;
use laporin::modules::ledger::{LedgerSnapshot, RawTransactionRow, ReferenceData};
use laporin::modules::query::{AiOracle, GeminiOracle, QueryResolver};

/// Snapshot file layout: reference data plus raw rows, as exported by
/// the spreadsheet sync job.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    reference: ReferenceData,
    rows: Vec<RawTransactionRow>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laporin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting Laporin query demo");
    tracing::info!("Environment: {}", config.app.env);

    let mut args = std::env::args().skip(1);
    let snapshot_path = args.next().unwrap_or_else(|| "snapshot.json".to_string());
    let question: String = args.collect::<Vec<_>>().join(" ");
    let question = if question.is_empty() {
        "pendapatan hari ini".to_string()
    } else {
        question
    };

    let raw = std::fs::read_to_string(&snapshot_path)
        .map_err(|e| laporin::core::AppError::ledger_fetch(format!("{}: {}", snapshot_path, e)))?;
    let snapshot_file: SnapshotFile = serde_json::from_str(&raw)?;
    let ledger = LedgerSnapshot::from_rows(snapshot_file.rows, snapshot_file.reference);
    tracing::info!(records = ledger.len(), "snapshot loaded");

    let oracle: Option<Arc<dyn AiOracle>> = config.oracle.api_key.clone().map(|key| {
        Arc::new(GeminiOracle::new(
            key,
            Some(config.oracle.base_url.clone()),
            config.oracle.model.clone(),
        )) as Arc<dyn AiOracle>
    });

    let resolver = QueryResolver::new(
        ledger,
        oracle,
        config.report.week_start,
        config.report.days_per_month,
        config.oracle.timeout(),
    );

    let today = Local::now().date_naive();
    match resolver.answer(&question, today).await {
        Ok(answer) => println!("{}", answer.text()),
        Err(err) => {
            tracing::error!(error = %err, "query failed");
            println!("{}", err.user_message());
        }
    }

    Ok(())
}

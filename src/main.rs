//! Revenue report over a document-store snapshot.
//!
//! ```text
//! service-engagement <snapshot.json> <user-id> [YYYY-MM-DD]
//! ```
//!
//! Prints the reconciled report and activity heatmap as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use service_engagement::adapters::{load_snapshot, InMemoryDocumentStore, SnapshotError};
use service_engagement::application::{GetRevenueReportHandler, GetRevenueReportQuery};
use service_engagement::config::{AppConfig, LoggingConfig};
use service_engagement::domain::foundation::UserId;

const USAGE: &str = "service-engagement <snapshot.json> <user-id> [YYYY-MM-DD]";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load_validated() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(&config, std::env::args().skip(1).collect()).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "revenue report failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(config: &AppConfig, args: Vec<String>) -> Result<String, SnapshotError> {
    let (path, user_id, today) = parse_args(&args)?;

    let snapshot = load_snapshot(path).await?;
    info!(path = %path, records = snapshot.record_count(), "snapshot loaded");

    let store = Arc::new(InMemoryDocumentStore::from_snapshot(snapshot));
    let handler = GetRevenueReportHandler::new(store.clone(), store.clone(), store.clone(), store)
        .with_policy(config.reconciliation.policy());

    let result = handler
        .handle(GetRevenueReportQuery { user_id, today })
        .await?;

    serde_json::to_string_pretty(&result).map_err(SnapshotError::Render)
}

fn parse_args(args: &[String]) -> Result<(&str, UserId, Option<NaiveDate>), SnapshotError> {
    let usage = || SnapshotError::Usage(USAGE.to_string());
    let (path, user) = match args {
        [path, user] | [path, user, _] => (path.as_str(), user),
        _ => return Err(usage()),
    };
    let user_id = UserId::new(user.as_str())
        .map_err(|e| SnapshotError::Usage(format!("{USAGE} ({e})")))?;
    let today = match args.get(2) {
        Some(day) => Some(
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| SnapshotError::Usage(format!("{USAGE} (date: {e})")))?,
        ),
        None => None,
    };
    Ok((path, user_id, today))
}

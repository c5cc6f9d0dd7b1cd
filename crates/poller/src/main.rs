use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use database::Database;
use reconciler::{run_backfill, run_sweep, LoggingNotifier, WbConnector};
use wb_api::WbConfig;

#[derive(Debug, Parser)]
#[command(name = "poller")]
#[command(about = "Poll marketplace reviews for all accounts on a schedule")]
struct Args {
    /// SQLite database URL
    #[arg(long, default_value = "sqlite:otvet.db?mode=rwc")]
    database_url: String,

    /// Seconds between reconciliation sweeps
    #[arg(long, default_value_t = 300)]
    interval_secs: u64,

    /// Run a single sweep and exit (cron-style use)
    #[arg(long)]
    once: bool,

    /// Refresh photo URLs and product metadata of stored reviews, then exit
    #[arg(long)]
    backfill: bool,

    /// Override the feedbacks API base URL
    #[arg(long)]
    api_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let db = Database::connect(&args.database_url).await?;
    db.migrate().await?;

    let config = match &args.api_base_url {
        Some(base_url) => WbConfig::new(base_url.clone()),
        None => WbConfig::default(),
    };
    let connector = WbConnector::new(config);
    let notifier = LoggingNotifier;

    if args.backfill {
        let updated = run_backfill(&db, &connector).await;
        info!(updated, "Backfill finished");
        return Ok(());
    }

    if args.once {
        let report = run_sweep(&db, &connector, &notifier).await;
        info!(?report, "Sweep finished");
        return Ok(());
    }

    info!(interval_secs = args.interval_secs, "Starting poll loop");
    let mut interval = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = run_sweep(&db, &connector, &notifier).await;
                if report.new_reviews > 0 || report.auto_replies > 0 {
                    info!(?report, "Sweep finished");
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for shutdown signal: {e}");
                }
                info!("Shutting down");
                break;
            }
        }
    }

    db.close().await;
    Ok(())
}

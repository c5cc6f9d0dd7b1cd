//! The scheduled reconciliation sweep over all accounts.

use database::{account, Database};
use tracing::{error, info, warn};

use crate::api::ApiConnector;
use crate::autoreply::run_auto_reply;
use crate::ingest::ingest_account;
use crate::notify::{new_reviews_message, Notifier};

/// Outcome of one sweep across all accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Accounts with a credential that were visited.
    pub accounts_processed: u32,
    /// Reviews inserted across all accounts.
    pub new_reviews: u32,
    /// Auto-replies confirmed across all accounts.
    pub auto_replies: u32,
}

/// Run one reconciliation pass over every account with a credential.
///
/// Per account: ingest new reviews, notify the owner about the delta, then
/// let the auto-reply engine see the freshly inserted rows, in that order.
/// Failures are contained per account; the sweep itself never fails, so a
/// broken account can never take down the scheduler.
pub async fn run_sweep<C, N>(db: &Database, connector: &C, notifier: &N) -> SweepReport
where
    C: ApiConnector,
    N: Notifier,
{
    info!("Starting scheduled reviews check");
    let mut report = SweepReport::default();

    let accounts = match account::list_accounts_with_key(db.pool()).await {
        Ok(accounts) => accounts,
        Err(e) => {
            error!("Failed to list accounts for sweep: {e}");
            return report;
        }
    };

    for acct in &accounts {
        let Some(api_key) = acct.api_key.as_deref() else {
            continue;
        };

        let api = match connector.connect(api_key) {
            Ok(api) => api,
            Err(e) => {
                error!(account_id = acct.id, "Failed to build API client: {e}");
                continue;
            }
        };

        report.accounts_processed += 1;

        let inserted = match ingest_account(db, &api, acct).await {
            Ok(inserted) => inserted,
            Err(e) => {
                error!(account_id = acct.id, "Error processing account: {e}");
                continue;
            }
        };
        report.new_reviews += inserted;

        // Notification failure never affects the committed inserts.
        if inserted > 0 && acct.notifications_enabled {
            if let Err(e) = notifier.notify(acct.id, &new_reviews_message(inserted)).await {
                warn!(account_id = acct.id, "Notification error: {e}");
            }
        }

        if acct.auto_reply_enabled {
            match run_auto_reply(db, &api, acct).await {
                Ok(replied) => report.auto_replies += replied,
                Err(e) => {
                    error!(account_id = acct.id, "Auto-reply error: {e}");
                }
            }
        }

        // Let interactive sessions in between accounts.
        tokio::task::yield_now().await;
    }

    info!(
        accounts = report.accounts_processed,
        new_reviews = report.new_reviews,
        auto_replies = report.auto_replies,
        "Sweep complete"
    );
    report
}

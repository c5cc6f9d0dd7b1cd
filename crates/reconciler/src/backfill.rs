//! Maintenance backfill of photo URLs and product metadata.
//!
//! Earlier schema revisions stored reviews without photo URLs or product
//! details. This pass re-fetches both feedback pages per account and
//! updates already-stored rows in place, leaving reply state untouched.

use database::models::Account;
use database::{account, review, Database, DatabaseError};
use tracing::{error, info, warn};

use crate::api::{ApiConnector, ReviewApi};
use crate::error::ReconcilerError;
use crate::normalize::normalize;

/// Refresh metadata of stored reviews for every account with a credential.
///
/// Returns the total number of updated rows. Per-account failures are
/// contained exactly like in the reconciliation sweep.
pub async fn run_backfill<C: ApiConnector>(db: &Database, connector: &C) -> u32 {
    info!("Starting metadata backfill");
    let mut updated_total = 0u32;

    let accounts = match account::list_accounts_with_key(db.pool()).await {
        Ok(accounts) => accounts,
        Err(e) => {
            error!("Failed to list accounts for backfill: {e}");
            return 0;
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

        match backfill_account(db, &api, acct).await {
            Ok(updated) => updated_total += updated,
            Err(e) => {
                error!(account_id = acct.id, "Error backfilling account: {e}");
            }
        }

        tokio::task::yield_now().await;
    }

    info!(updated = updated_total, "Backfill complete");
    updated_total
}

/// Refresh metadata of one account's stored reviews.
pub async fn backfill_account<A: ReviewApi>(
    db: &Database,
    api: &A,
    acct: &Account,
) -> Result<u32, ReconcilerError> {
    let mut raw_reviews = api.fetch_unanswered().await;
    raw_reviews.extend(api.fetch_answered().await);
    if raw_reviews.is_empty() {
        return Ok(0);
    }

    let mut tx = db.pool().begin().await.map_err(DatabaseError::Sqlx)?;
    let mut updated = 0u32;
    for raw in &raw_reviews {
        let n = normalize(raw);
        if n.source_id.is_empty() {
            continue;
        }
        // Nothing to backfill for rows the remote serves without metadata.
        if !n.has_photos
            && n.product_name.is_empty()
            && n.supplier_article.is_empty()
            && n.subject_name.is_empty()
        {
            continue;
        }

        let result = review::update_metadata(
            &mut *tx,
            &n.source_id,
            acct.id,
            n.has_photos,
            &n.photo_urls_json(),
            &n.product_name,
            &n.product_id,
            &n.supplier_article,
            &n.subject_name,
        )
        .await;

        match result {
            // False means the review was never stored locally; that is
            // expected for content-filtered or pre-registration reviews.
            Ok(true) => updated += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(
                    account_id = acct.id,
                    source_id = %n.source_id,
                    "Error updating review metadata: {e}"
                );
            }
        }
    }
    tx.commit().await.map_err(DatabaseError::Sqlx)?;

    info!(account_id = acct.id, updated, "Backfilled review metadata");
    Ok(updated)
}

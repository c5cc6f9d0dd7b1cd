//! Per-account ingestion of remote reviews into the store.

use database::models::{Account, NewReview};
use database::{review, Database, DatabaseError};
use tracing::{debug, info, warn};

use crate::api::ReviewApi;
use crate::error::ReconcilerError;
use crate::normalize::{has_content, normalize, NormalizedReview};

/// Fetch the account's unanswered reviews and persist the genuinely new ones.
///
/// Repeated polls are idempotent: reviews already stored under the same
/// (source id, account) pair are skipped. Reviews with no substantive
/// content never enter the store. Returns the count of inserted rows.
pub async fn ingest_account<A: ReviewApi>(
    db: &Database,
    api: &A,
    account: &Account,
) -> Result<u32, ReconcilerError> {
    let raw_reviews = api.fetch_unanswered().await;
    if raw_reviews.is_empty() {
        return Ok(0);
    }

    // Normalize and filter before touching the store.
    let candidates: Vec<NormalizedReview> = raw_reviews
        .iter()
        .map(normalize)
        .filter(|n| {
            if n.source_id.is_empty() {
                warn!(account_id = account.id, "Dropping review with no id");
                return false;
            }
            if !has_content(n) {
                debug!(
                    account_id = account.id,
                    source_id = %n.source_id,
                    "Skipping content-less review"
                );
                return false;
            }
            true
        })
        .collect();

    // Duplicate check against committed state; the unique index backstops
    // the race window between this check and the commit below.
    let mut fresh = Vec::new();
    for candidate in candidates {
        if review::exists(db.pool(), &candidate.source_id, account.id).await? {
            continue;
        }
        fresh.push(candidate);
    }

    if fresh.is_empty() {
        return Ok(0);
    }

    // One commit per account; a bad row is logged and skipped, never fatal
    // to the rest of the batch.
    let mut tx = db.pool().begin().await.map_err(DatabaseError::Sqlx)?;
    let mut inserted = 0u32;
    for candidate in &fresh {
        let new_review = to_new_review(account.id, candidate);
        match review::insert(&mut *tx, &new_review).await {
            Ok(()) => inserted += 1,
            Err(DatabaseError::AlreadyExists { .. }) => {
                debug!(
                    account_id = account.id,
                    source_id = %candidate.source_id,
                    "Concurrent duplicate insert, skipping"
                );
            }
            Err(e) => {
                warn!(
                    account_id = account.id,
                    source_id = %candidate.source_id,
                    "Failed to save review: {e}"
                );
            }
        }
    }
    tx.commit().await.map_err(DatabaseError::Sqlx)?;

    info!(account_id = account.id, inserted, "Saved new reviews");
    Ok(inserted)
}

fn to_new_review(account_id: i64, n: &NormalizedReview) -> NewReview {
    NewReview {
        account_id,
        source_id: n.source_id.clone(),
        stars: n.stars,
        comment: n.comment.clone(),
        pros: n.pros.clone(),
        cons: n.cons.clone(),
        has_photos: n.has_photos,
        photo_urls: n.photo_urls_json(),
        product_name: n.product_name.clone(),
        product_id: n.product_id.clone(),
        supplier_article: n.supplier_article.clone(),
        subject_name: n.subject_name.clone(),
    }
}

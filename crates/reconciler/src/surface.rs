//! Operations exposed to the conversational front-end.

use database::models::Review;
use database::{review, Database, DatabaseError};
use tracing::{info, warn};

use crate::api::ReviewApi;
use crate::error::ReconcilerError;

/// Reviews shown per page in the front-end's unanswered list.
pub const REVIEWS_PER_PAGE: usize = 5;

/// One page of an account's unanswered reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPage {
    /// Reviews on this page, newest first.
    pub reviews: Vec<Review>,
    /// Page index actually served (requested index clamped into range).
    pub page: usize,
    /// Total number of pages.
    pub total_pages: usize,
}

/// List one page of the account's unanswered reviews, newest first.
///
/// An out-of-range page index is clamped rather than rejected so the
/// front-end's pagination buttons cannot strand a session.
pub async fn list_unanswered(
    db: &Database,
    account_id: i64,
    page: usize,
) -> Result<ReviewPage, ReconcilerError> {
    let reviews = review::list_unanswered(db.pool(), account_id).await?;

    let total_pages = reviews.len().div_ceil(REVIEWS_PER_PAGE).max(1);
    let page = page.min(total_pages - 1);
    let start = page * REVIEWS_PER_PAGE;
    let reviews = reviews
        .into_iter()
        .skip(start)
        .take(REVIEWS_PER_PAGE)
        .collect();

    Ok(ReviewPage {
        reviews,
        page,
        total_pages,
    })
}

/// Get one stored review for the front-end's detail card.
pub async fn get_review(
    db: &Database,
    account_id: i64,
    source_id: &str,
) -> Result<Option<Review>, ReconcilerError> {
    Ok(review::get(db.pool(), account_id, source_id).await?)
}

/// Submit a manual (or generated) reply for a stored review.
///
/// Shares the auto-reply engine's at-least-once semantics: the stored row
/// is marked answered only after the remote API confirmed the reply.
pub async fn send_reply<A: ReviewApi>(
    db: &Database,
    api: &A,
    account_id: i64,
    source_id: &str,
    text: &str,
) -> bool {
    if !api.send_reply(source_id, text).await {
        return false;
    }

    let result: Result<(), DatabaseError> = async {
        let mut tx = db.pool().begin().await?;
        review::mark_answered(&mut *tx, source_id, account_id, text).await?;
        tx.commit().await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            info!(account_id, source_id, "Manual reply recorded");
            true
        }
        Err(e) => {
            // The remote reply went out; only the local flag is stale. The
            // next get-by-id fetch shows it answered remotely.
            warn!(account_id, source_id, "Failed to record reply: {e}");
            true
        }
    }
}

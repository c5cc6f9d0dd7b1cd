//! Auto-reply engine for stored unanswered reviews.

use database::models::{Account, Review};
use database::{review, Database, DatabaseError};
use tracing::{debug, info, warn};

use crate::api::ReviewApi;
use crate::error::ReconcilerError;
use crate::normalize::is_substantive;

/// Fixed acknowledgement body of a composed auto-reply.
const REPLY_BODY: &str = "Спасибо за ваш отзыв! Мы ценим ваше мнение.";

/// Answer the account's qualifying unanswered reviews.
///
/// A review is only marked answered locally after the remote API confirmed
/// the reply; a failed send leaves it eligible for the next pass. Returns
/// the count of confirmed replies.
pub async fn run_auto_reply<A: ReviewApi>(
    db: &Database,
    api: &A,
    account: &Account,
) -> Result<u32, ReconcilerError> {
    let unanswered = review::list_unanswered(db.pool(), account.id).await?;
    if unanswered.is_empty() {
        return Ok(0);
    }

    let reply_text = compose_reply(account);

    // Send first, collect confirmations; local flags commit in one batch
    // after the scan. Delivery is at-least-once: a crash between send and
    // commit re-sends the reply on the next pass.
    let mut confirmed: Vec<String> = Vec::new();
    for stored in &unanswered {
        if !qualifies(account, stored) {
            continue;
        }

        if api.send_reply(&stored.source_id, &reply_text).await {
            debug!(
                account_id = account.id,
                source_id = %stored.source_id,
                "Auto-reply confirmed"
            );
            confirmed.push(stored.source_id.clone());
        } else {
            warn!(
                account_id = account.id,
                source_id = %stored.source_id,
                "Auto-reply send failed, review stays unanswered"
            );
        }
    }

    if confirmed.is_empty() {
        return Ok(0);
    }

    let mut tx = db.pool().begin().await.map_err(DatabaseError::Sqlx)?;
    let mut replied = 0u32;
    for source_id in &confirmed {
        match review::mark_answered(&mut *tx, source_id, account.id, &reply_text).await {
            Ok(()) => replied += 1,
            Err(e) => {
                warn!(
                    account_id = account.id,
                    source_id = %source_id,
                    "Failed to record auto-reply: {e}"
                );
            }
        }
    }
    tx.commit().await.map_err(DatabaseError::Sqlx)?;

    info!(account_id = account.id, replied, "Auto-replied to reviews");
    Ok(replied)
}

/// Whether the account's enabled policies match this stored review.
///
/// Current policy: five-star auto-reply is on, the rating is 5, and the
/// review lists no drawbacks (blank or the "not specified" placeholder).
pub fn qualifies(account: &Account, review: &Review) -> bool {
    account.auto_reply_five_stars && review.stars == 5 && !is_substantive(&review.cons)
}

/// Compose the reply text: optional greeting, fixed body, optional farewell.
pub fn compose_reply(account: &Account) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if let Some(greeting) = account.greeting.as_deref() {
        if !greeting.trim().is_empty() {
            parts.push(greeting.trim());
        }
    }
    parts.push(REPLY_BODY);
    if let Some(farewell) = account.farewell.as_deref() {
        if !farewell.trim().is_empty() {
            parts.push(farewell.trim());
        }
    }
    parts.join(" ")
}

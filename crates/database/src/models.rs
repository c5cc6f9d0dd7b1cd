//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A bot account, identified by the owner's chat id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Chat id of the account owner.
    pub id: i64,
    /// Marketplace API credential. Accounts without one are skipped by the sweep.
    pub api_key: Option<String>,
    /// Whether to notify the owner about newly ingested reviews.
    pub notifications_enabled: bool,
    /// Master switch for the auto-reply engine.
    pub auto_reply_enabled: bool,
    /// Auto-reply policy: answer 5-star reviews with no listed drawbacks.
    pub auto_reply_five_stars: bool,
    /// Optional fragment prepended to composed replies.
    pub greeting: Option<String>,
    /// Optional fragment appended to composed replies.
    pub farewell: Option<String>,
}

impl Account {
    /// A fresh account with every toggle off.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            api_key: None,
            notifications_enabled: false,
            auto_reply_enabled: false,
            auto_reply_five_stars: false,
            greeting: None,
            farewell: None,
        }
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    /// Auto-incrementing row id.
    pub id: i64,
    /// Owning account.
    pub account_id: i64,
    /// Id assigned by the remote API, stringified.
    pub source_id: String,
    /// Star rating (1-5; 0 when the payload was malformed).
    pub stars: i64,
    /// Free-text comment.
    pub comment: String,
    /// Free-text pros.
    pub pros: String,
    /// Free-text cons.
    pub cons: String,
    /// Whether the review carries at least one photo.
    pub has_photos: bool,
    /// JSON-serialized list of photo URLs ("[]" when none).
    pub photo_urls: String,
    /// Submitted reply text, set together with `answered`.
    pub response: Option<String>,
    /// Whether a reply has been confirmed by the remote API.
    pub answered: bool,
    /// Product name from the review's product details.
    pub product_name: String,
    /// Remote product id (nmId).
    pub product_id: String,
    /// Supplier article code.
    pub supplier_article: String,
    /// Product category/subject name.
    pub subject_name: String,
}

/// A review about to be inserted (no row id yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub account_id: i64,
    pub source_id: String,
    pub stars: i64,
    pub comment: String,
    pub pros: String,
    pub cons: String,
    pub has_photos: bool,
    pub photo_urls: String,
    pub product_name: String,
    pub product_id: String,
    pub supplier_article: String,
    pub subject_name: String,
}

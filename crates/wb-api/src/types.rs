//! Wire types for the feedbacks API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw feedback as the remote API returns it.
///
/// The payload shape varies between API revisions (photo links alone come
/// in three shapes), so raw feedbacks stay untyped until normalization.
pub type RawReview = Value;

/// Sort order for feedback listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first. The default for polling.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
}

impl SortOrder {
    /// Wire token for the `order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::DateDesc => "dateDesc",
            SortOrder::DateAsc => "dateAsc",
        }
    }
}

/// Envelope of the feedbacks listing endpoint: `{"data": {"feedbacks": [...]}}`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbacksResponse {
    #[serde(default)]
    pub data: FeedbacksData,
}

/// Inner payload of [`FeedbacksResponse`].
#[derive(Debug, Default, Deserialize)]
pub struct FeedbacksData {
    #[serde(default)]
    pub feedbacks: Vec<RawReview>,
}

/// Body of the reply endpoint.
#[derive(Debug, Serialize)]
pub struct ReplyRequest<'a> {
    pub text: &'a str,
}

/// Stringify a feedback id, which the API serves as either a string or a number.
pub fn id_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
